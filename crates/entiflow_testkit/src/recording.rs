//! Writers that record or fail, for asserting driver interactions.

use async_trait::async_trait;
use entiflow_core::{BoxError, Writer};
use parking_lot::Mutex;

/// One write dispatched to a [`RecordingWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp<T> {
    /// A `create` call.
    Create {
        /// The value that was persisted.
        target: T,
    },
    /// An `update` call.
    Update {
        /// The previously persisted value.
        source: T,
        /// Its replacement.
        target: T,
    },
    /// A `delete` call.
    Delete {
        /// The value that was removed.
        source: T,
    },
}

/// A writer that records every call it receives.
///
/// Keep a shared handle to assert exactly which driver calls a chain
/// performed, and in which order.
#[derive(Debug, Default)]
pub struct RecordingWriter<T> {
    ops: Mutex<Vec<WriteOp<T>>>,
}

impl<T: Clone> RecordingWriter<T> {
    /// Creates an empty recording writer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ops: Mutex::new(Vec::new()),
        }
    }

    /// Returns every recorded write in dispatch order.
    #[must_use]
    pub fn ops(&self) -> Vec<WriteOp<T>> {
        self.ops.lock().clone()
    }

    /// Returns the number of recorded writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.lock().len()
    }

    /// Returns true when nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.lock().is_empty()
    }

    /// Returns how many `create` calls were recorded.
    #[must_use]
    pub fn created(&self) -> usize {
        self.count(|op| matches!(op, WriteOp::Create { .. }))
    }

    /// Returns how many `update` calls were recorded.
    #[must_use]
    pub fn updated(&self) -> usize {
        self.count(|op| matches!(op, WriteOp::Update { .. }))
    }

    /// Returns how many `delete` calls were recorded.
    #[must_use]
    pub fn deleted(&self) -> usize {
        self.count(|op| matches!(op, WriteOp::Delete { .. }))
    }

    fn count(&self, matches: impl Fn(&WriteOp<T>) -> bool) -> usize {
        self.ops.lock().iter().filter(|op| matches(op)).count()
    }
}

#[async_trait]
impl<T, O> Writer<T, O> for RecordingWriter<T>
where
    T: Clone + Send + Sync,
    O: Send + Sync,
{
    async fn create(&self, target: &T, _options: &O) -> Result<(), BoxError> {
        self.ops.lock().push(WriteOp::Create {
            target: target.clone(),
        });
        Ok(())
    }

    async fn update(&self, source: &T, target: &T, _options: &O) -> Result<(), BoxError> {
        self.ops.lock().push(WriteOp::Update {
            source: source.clone(),
            target: target.clone(),
        });
        Ok(())
    }

    async fn delete(&self, source: &T, _options: &O) -> Result<(), BoxError> {
        self.ops.lock().push(WriteOp::Delete {
            source: source.clone(),
        });
        Ok(())
    }
}

/// A writer that fails every call with a fixed message.
#[derive(Debug, Clone)]
pub struct FailingWriter {
    message: String,
}

impl FailingWriter {
    /// Creates a writer failing with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn fail(&self) -> Result<(), BoxError> {
        Err(self.message.clone().into())
    }
}

#[async_trait]
impl<T, O> Writer<T, O> for FailingWriter
where
    T: Send + Sync,
    O: Send + Sync,
{
    async fn create(&self, _target: &T, _options: &O) -> Result<(), BoxError> {
        self.fail()
    }

    async fn update(&self, _source: &T, _target: &T, _options: &O) -> Result<(), BoxError> {
        self.fail()
    }

    async fn delete(&self, _source: &T, _options: &O) -> Result<(), BoxError> {
        self.fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_dispatch_order() {
        let writer = RecordingWriter::new();
        Writer::<_, ()>::create(&writer, &1, &()).await.unwrap();
        Writer::<_, ()>::update(&writer, &1, &2, &()).await.unwrap();
        Writer::<_, ()>::delete(&writer, &2, &()).await.unwrap();

        assert_eq!(
            writer.ops(),
            vec![
                WriteOp::Create { target: 1 },
                WriteOp::Update {
                    source: 1,
                    target: 2
                },
                WriteOp::Delete { source: 2 },
            ]
        );
        assert_eq!(writer.created(), 1);
        assert_eq!(writer.updated(), 1);
        assert_eq!(writer.deleted(), 1);
        assert_eq!(writer.len(), 3);
    }

    #[tokio::test]
    async fn failing_writer_fails_every_call() {
        let writer = FailingWriter::new("nope");
        let err = Writer::<i32, ()>::create(&writer, &1, &()).await.unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}
