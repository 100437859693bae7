//! Driver write contract and dispatch.

use crate::error::{BoxError, CoreError, CoreResult};
use crate::status::Status;
use async_trait::async_trait;
use tracing::debug;

/// The persistence side of a driver.
///
/// A writer receives the net change of a resolved mutation chain as
/// one `create`, `update`, or `delete` call. Implementations override
/// only the operations their store supports; the default bodies are
/// no-ops.
///
/// # Invariants
///
/// - `create` receives a target that was never persisted
/// - `update` receives the last persisted value and its replacement
/// - `delete` receives the last persisted value
/// - Errors are surfaced to the caller unmodified and never retried
#[async_trait]
pub trait Writer<T, O>: Send + Sync
where
    T: Send + Sync,
    O: Send + Sync,
{
    /// Persists a newly created entity.
    async fn create(&self, _target: &T, _options: &O) -> Result<(), BoxError> {
        Ok(())
    }

    /// Persists the replacement of an existing entity.
    async fn update(&self, _source: &T, _target: &T, _options: &O) -> Result<(), BoxError> {
        Ok(())
    }

    /// Removes a persisted entity.
    async fn delete(&self, _source: &T, _options: &O) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Writer used when no driver is configured.
pub(crate) struct NoopWriter;

#[async_trait]
impl<T: Send + Sync, O: Send + Sync> Writer<T, O> for NoopWriter {}

/// Dispatches a dirty status to the driver and returns the committed
/// status. Clean statuses skip the driver entirely, which makes an
/// explicit commit step idempotent.
pub(crate) async fn write_status<T, O>(
    writer: &dyn Writer<T, O>,
    status: Status<T>,
    options: &O,
) -> CoreResult<Status<T>>
where
    T: Send + Sync,
    O: Send + Sync,
{
    let kind = match status.kind() {
        Some(kind) => kind,
        None => return Ok(status),
    };
    debug!("dispatching {} to driver", kind);
    let result = match (status.source.as_deref(), status.target.as_deref()) {
        (None, Some(target)) => writer.create(target, options).await,
        (Some(source), None) => writer.delete(source, options).await,
        (Some(source), Some(target)) => writer.update(source, target, options).await,
        // Clean by definition, already returned above.
        (None, None) => Ok(()),
    };
    result.map_err(CoreError::Driver)?;
    Ok(status.commit())
}
