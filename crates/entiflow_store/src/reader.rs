//! Driver read contract.

use async_trait::async_trait;
use entiflow_core::BoxError;
use futures::stream::BoxStream;
use futures::StreamExt;

/// The query side of a driver.
///
/// A reader resolves queries into entity data. Implementations
/// override only the operations their store supports: the default
/// `find` matches nothing and the default `filter` is empty.
///
/// # Invariants
///
/// - `find` returns at most one entity
/// - `filter` may stream any number of entities, lazily
/// - Errors are surfaced to the caller unmodified and never retried
#[async_trait]
pub trait Reader<T, Q, O>: Send + Sync
where
    T: Send + Sync + 'static,
    Q: Send + Sync,
    O: Send + Sync,
{
    /// Finds at most one entity matching the query.
    async fn find(&self, _query: &Q, _options: &O) -> Result<Option<T>, BoxError> {
        Ok(None)
    }

    /// Streams every entity matching the query.
    fn filter(&self, _query: &Q, _options: &O) -> BoxStream<'static, Result<T, BoxError>> {
        futures::stream::empty().boxed()
    }
}
