//! Test fixtures and store helpers.
//!
//! Provides a small entity type plus convenience constructors for
//! wiring stores over the in-memory driver.

use crate::memory::{Identify, MemoryDriver, MemoryQuery};
use entiflow_core::Assign;
use entiflow_store::{Store, StoreSettings};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Stable identifier.
    pub id: Uuid,
    /// Human-readable title.
    pub title: String,
    /// Whether the item is completed.
    pub done: bool,
}

impl Todo {
    /// Creates an open todo with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            done: false,
        }
    }
}

impl Identify for Todo {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Partial update of a [`Todo`].
#[derive(Debug, Clone, Default)]
pub struct TodoPatch {
    /// Replaces the title when set.
    pub title: Option<String>,
    /// Replaces the completion flag when set.
    pub done: Option<bool>,
}

impl Assign<TodoPatch> for Todo {
    fn assign(self, patch: TodoPatch) -> Self {
        Self {
            id: self.id,
            title: patch.title.unwrap_or(self.title),
            done: patch.done.unwrap_or(self.done),
        }
    }
}

/// Creates `count` open todos titled `todo-0`, `todo-1`, and so on.
#[must_use]
pub fn todos(count: usize) -> Vec<Todo> {
    (0..count).map(|index| Todo::new(format!("todo-{index}"))).collect()
}

/// Creates an empty in-memory store, returning the driver handle for
/// assertions alongside the store.
#[must_use]
pub fn todo_store() -> (Arc<MemoryDriver<Todo>>, Store<Todo, MemoryQuery, ()>) {
    todo_store_with(StoreSettings::default())
}

/// Creates an empty in-memory store with the given settings.
#[must_use]
pub fn todo_store_with(
    settings: StoreSettings,
) -> (Arc<MemoryDriver<Todo>>, Store<Todo, MemoryQuery, ()>) {
    let driver = Arc::new(MemoryDriver::new());
    let shared: Arc<dyn entiflow_store::Driver<Todo, MemoryQuery, ()>> =
        Arc::clone(&driver) as _;
    let store = Store::from_shared(shared, settings);
    (driver, store)
}
