//! In-memory driver for testing.

use async_trait::async_trait;
use entiflow_core::{BoxError, Writer};
use entiflow_store::Reader;
use futures::stream::BoxStream;
use futures::StreamExt;
use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

/// Entities stored by the in-memory driver expose a stable id.
pub trait Identify {
    /// Stable identifier of this entity.
    fn id(&self) -> Uuid;
}

/// Queries understood by the in-memory driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryQuery {
    /// Every stored entity, in insertion order.
    All,
    /// The entity with the given id.
    ById(Uuid),
}

/// Errors raised by the in-memory driver when a write violates its
/// preconditions.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// `create` received an id that is already stored.
    #[error("duplicate entity {0}")]
    Duplicate(Uuid),
    /// `update` or `delete` received an id that is not stored.
    #[error("unknown entity {0}")]
    Unknown(Uuid),
}

/// An in-memory driver.
///
/// Stores entities in insertion order and validates the write
/// contract: `create` rejects duplicates, `update` and `delete`
/// reject unknown entities. Suitable for unit and integration tests.
///
/// # Thread Safety
///
/// The driver is thread-safe and meant to be shared behind an `Arc`,
/// keeping a handle for assertions while a store owns it.
#[derive(Debug, Default)]
pub struct MemoryDriver<T> {
    items: RwLock<Vec<(Uuid, T)>>,
}

impl<T> MemoryDriver<T>
where
    T: Identify + Clone,
{
    /// Creates an empty driver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    /// Creates a driver seeded with the given entities.
    #[must_use]
    pub fn with_items(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: RwLock::new(items.into_iter().map(|item| (item.id(), item)).collect()),
        }
    }

    /// Stores an entity directly, bypassing contract validation.
    pub fn insert(&self, item: T) {
        self.items.write().push((item.id(), item));
    }

    /// Returns the stored entity with the given id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<T> {
        self.items
            .read()
            .iter()
            .find(|(stored, _)| *stored == id)
            .map(|(_, item)| item.clone())
    }

    /// Returns every stored entity in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.items.read().iter().map(|(_, item)| item.clone()).collect()
    }

    /// Returns the number of stored entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns true when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl<T> Reader<T, MemoryQuery, ()> for MemoryDriver<T>
where
    T: Identify + Clone + Send + Sync + 'static,
{
    async fn find(&self, query: &MemoryQuery, _options: &()) -> Result<Option<T>, BoxError> {
        let items = self.items.read();
        let found = match query {
            MemoryQuery::All => items.first().map(|(_, item)| item.clone()),
            MemoryQuery::ById(id) => items
                .iter()
                .find(|(stored, _)| stored == id)
                .map(|(_, item)| item.clone()),
        };
        Ok(found)
    }

    fn filter(&self, query: &MemoryQuery, _options: &()) -> BoxStream<'static, Result<T, BoxError>> {
        let snapshot: Vec<T> = match query {
            MemoryQuery::All => self.items(),
            MemoryQuery::ById(id) => self.get(*id).into_iter().collect(),
        };
        futures::stream::iter(snapshot.into_iter().map(Ok)).boxed()
    }
}

#[async_trait]
impl<T> Writer<T, ()> for MemoryDriver<T>
where
    T: Identify + Clone + Send + Sync + 'static,
{
    async fn create(&self, target: &T, _options: &()) -> Result<(), BoxError> {
        let mut items = self.items.write();
        let id = target.id();
        if items.iter().any(|(stored, _)| *stored == id) {
            return Err(MemoryError::Duplicate(id).into());
        }
        items.push((id, target.clone()));
        Ok(())
    }

    async fn update(&self, source: &T, target: &T, _options: &()) -> Result<(), BoxError> {
        let mut items = self.items.write();
        let id = source.id();
        match items.iter_mut().find(|(stored, _)| *stored == id) {
            Some(slot) => {
                *slot = (target.id(), target.clone());
                Ok(())
            }
            None => Err(MemoryError::Unknown(id).into()),
        }
    }

    async fn delete(&self, source: &T, _options: &()) -> Result<(), BoxError> {
        let mut items = self.items.write();
        let id = source.id();
        match items.iter().position(|(stored, _)| *stored == id) {
            Some(index) => {
                items.remove(index);
                Ok(())
            }
            None => Err(MemoryError::Unknown(id).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: Uuid,
        value: i32,
    }

    impl Row {
        fn new(value: i32) -> Self {
            Self {
                id: Uuid::new_v4(),
                value,
            }
        }
    }

    impl Identify for Row {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    #[tokio::test]
    async fn create_then_find_roundtrips() {
        let driver = MemoryDriver::new();
        let row = Row::new(1);

        driver.create(&row, &()).await.unwrap();

        let found = driver
            .find(&MemoryQuery::ById(row.id), &())
            .await
            .unwrap();
        assert_eq!(found, Some(row));
    }

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let driver = MemoryDriver::new();
        let row = Row::new(1);

        driver.create(&row, &()).await.unwrap();
        let err = driver.create(&row, &()).await.unwrap_err();
        assert!(err.to_string().starts_with("duplicate entity"));
    }

    #[tokio::test]
    async fn update_replaces_the_stored_value() {
        let row = Row::new(1);
        let driver = MemoryDriver::with_items(vec![row.clone()]);

        let mut replacement = row.clone();
        replacement.value = 2;
        driver.update(&row, &replacement, &()).await.unwrap();

        assert_eq!(driver.get(row.id), Some(replacement));
        assert_eq!(driver.len(), 1);
    }

    #[tokio::test]
    async fn update_rejects_unknown_entities() {
        let driver = MemoryDriver::<Row>::new();
        let row = Row::new(1);
        let err = driver.update(&row, &row, &()).await.unwrap_err();
        assert!(err.to_string().starts_with("unknown entity"));
    }

    #[tokio::test]
    async fn delete_removes_the_entity() {
        let row = Row::new(1);
        let driver = MemoryDriver::with_items(vec![row.clone()]);

        driver.delete(&row, &()).await.unwrap();
        assert!(driver.is_empty());

        let err = driver.delete(&row, &()).await.unwrap_err();
        assert!(err.to_string().starts_with("unknown entity"));
    }

    #[tokio::test]
    async fn filter_streams_in_insertion_order() {
        let rows = vec![Row::new(1), Row::new(2), Row::new(3)];
        let driver = MemoryDriver::with_items(rows.clone());

        let streamed: Vec<Row> = driver
            .filter(&MemoryQuery::All, &())
            .try_collect()
            .await
            .unwrap();
        assert_eq!(streamed, rows);
    }
}
