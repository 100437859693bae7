//! Entity status snapshots.
//!
//! A [`Status`] is the immutable `{source, target}` pair that drives
//! dirty-checking and commit-kind inference. `source` is the last known
//! persisted value (`None` for a fresh entity), `target` the current
//! in-memory value (`None` once deleted). Both sides are `Arc`s so the
//! dirty check is reference identity, not structural equality: a chain
//! is clean only while `source` and `target` are literally the same
//! allocation.

use std::sync::Arc;

/// The driver call a dirty status requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    /// The entity was never persisted; `create` is pending.
    Create,
    /// The entity exists and was modified; `update` is pending.
    Update,
    /// The entity exists and was deleted; `delete` is pending.
    Delete,
}

impl std::fmt::Display for CommitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitKind::Create => write!(f, "create"),
            CommitKind::Update => write!(f, "update"),
            CommitKind::Delete => write!(f, "delete"),
        }
    }
}

/// Snapshot of an entity's persisted and in-memory state.
#[derive(Debug)]
pub struct Status<T> {
    /// Whether the entity was created within this chain.
    pub created: bool,
    /// Whether any mutator was applied within this chain.
    pub updated: bool,
    /// Whether the entity was deleted within this chain.
    pub deleted: bool,
    /// Last known persisted value; `None` if never persisted.
    pub source: Option<Arc<T>>,
    /// Current in-memory value; `None` once deleted (or absent).
    pub target: Option<Arc<T>>,
}

impl<T> Clone for Status<T> {
    fn clone(&self) -> Self {
        Self {
            created: self.created,
            updated: self.updated,
            deleted: self.deleted,
            source: self.source.clone(),
            target: self.target.clone(),
        }
    }
}

impl<T> Status<T> {
    /// Status of an entity created fresh, never persisted.
    pub fn created(data: T) -> Self {
        Self {
            created: true,
            updated: false,
            deleted: false,
            source: None,
            target: Some(Arc::new(data)),
        }
    }

    /// Status of an entity read from storage. Source and target share
    /// one allocation, so the status starts clean.
    pub fn read(data: T) -> Self {
        let data = Arc::new(data);
        Self {
            created: false,
            updated: false,
            deleted: false,
            source: Some(Arc::clone(&data)),
            target: Some(data),
        }
    }

    /// Status of a lookup that matched nothing.
    pub fn absent() -> Self {
        Self {
            created: false,
            updated: false,
            deleted: false,
            source: None,
            target: None,
        }
    }

    /// Replaces the target with a mutator result.
    #[must_use]
    pub fn update(self, data: T) -> Self {
        Self {
            updated: true,
            target: Some(Arc::new(data)),
            ..self
        }
    }

    /// Marks the entity deleted, independent of prior steps.
    #[must_use]
    pub fn delete(self) -> Self {
        Self {
            deleted: true,
            target: None,
            ..self
        }
    }

    /// Status after a successful driver call: the target becomes the
    /// persisted value and the lifecycle flags reset.
    #[must_use]
    pub fn commit(self) -> Self {
        Self {
            created: false,
            updated: false,
            deleted: false,
            source: self.target.clone(),
            target: self.target,
        }
    }

    /// Whether the chain produced a different object than the one last
    /// persisted. Reference identity, not structural equality; two
    /// `None` sides count as identical.
    #[must_use]
    pub fn should_commit(&self) -> bool {
        match (&self.source, &self.target) {
            (None, None) => false,
            (Some(source), Some(target)) => !Arc::ptr_eq(source, target),
            _ => true,
        }
    }

    /// The driver call this status requires, or `None` when clean.
    #[must_use]
    pub fn kind(&self) -> Option<CommitKind> {
        if !self.should_commit() {
            return None;
        }
        Some(match (&self.source, &self.target) {
            (None, _) => CommitKind::Create,
            (_, None) => CommitKind::Delete,
            _ => CommitKind::Update,
        })
    }
}
