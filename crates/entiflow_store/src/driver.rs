//! Combined driver contract.

use crate::reader::Reader;
use async_trait::async_trait;
use entiflow_core::{BoxError, Writer};
use std::sync::Arc;

/// A full persistence driver: queries plus writes.
///
/// Blanket-implemented for anything that is both a [`Reader`] and a
/// [`Writer`], so a driver type only implements the two side traits.
pub trait Driver<T, Q, O>: Reader<T, Q, O> + Writer<T, O>
where
    T: Send + Sync + 'static,
    Q: Send + Sync,
    O: Send + Sync,
{
}

impl<D, T, Q, O> Driver<T, Q, O> for D
where
    D: Reader<T, Q, O> + Writer<T, O>,
    T: Send + Sync + 'static,
    Q: Send + Sync,
    O: Send + Sync,
{
}

/// Exposes the write half of a shared driver as a plain [`Writer`].
///
/// Entity chains hold an `Arc<dyn Writer>`; this adapter forwards to
/// the store's driver without requiring trait upcasting.
pub(crate) struct DriverWriter<T, Q, O>(pub(crate) Arc<dyn Driver<T, Q, O>>)
where
    T: Send + Sync + 'static,
    Q: Send + Sync,
    O: Send + Sync;

#[async_trait]
impl<T, Q, O> Writer<T, O> for DriverWriter<T, Q, O>
where
    T: Send + Sync + 'static,
    Q: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    async fn create(&self, target: &T, options: &O) -> Result<(), BoxError> {
        self.0.create(target, options).await
    }

    async fn update(&self, source: &T, target: &T, options: &O) -> Result<(), BoxError> {
        self.0.update(source, target, options).await
    }

    async fn delete(&self, source: &T, options: &O) -> Result<(), BoxError> {
        self.0.delete(source, options).await
    }
}
