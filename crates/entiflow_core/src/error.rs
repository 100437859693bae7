//! Error types for the Entiflow core.

use crate::status::CommitKind;
use thiserror::Error;

/// Boxed error type accepted from drivers, mutators, and lazy sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// The kind of engine handle a lock error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// A single-entity handle.
    Entity,
    /// A plural streaming handle.
    Entities,
}

impl std::fmt::Display for HandleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleKind::Entity => write!(f, "entity"),
            HandleKind::Entities => write!(f, "entities"),
        }
    }
}

/// Errors that can occur while building or resolving a mutation chain.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A fluent method was called on a handle that a later call has
    /// already superseded. Mutation must continue through the newest
    /// handle.
    #[error("{kind} handle is locked: a later operation owns this chain")]
    Locked {
        /// Which kind of handle was used after being superseded.
        kind: HandleKind,
    },

    /// Auto-commit was disabled, safe mode was on, and a pending
    /// change was never explicitly committed.
    #[error("a pending {kind} was never committed")]
    ExpectedCommit {
        /// The driver call the chain would have required.
        kind: CommitKind,
    },

    /// A query matched no entity and no fallback was supplied.
    #[error("entity not found")]
    NotFound,

    /// Error raised by the external driver; surfaced unmodified.
    #[error("{0}")]
    Driver(BoxError),

    /// Error raised by a mutator step.
    #[error("mutator error: {0}")]
    Mutator(BoxError),

    /// Error raised while resolving a lazy source.
    #[error("source error: {0}")]
    Source(BoxError),
}

impl CoreError {
    /// Creates a lock error for an entity handle.
    pub fn locked(kind: HandleKind) -> Self {
        Self::Locked { kind }
    }

    /// Creates an expected-commit error for the given pending call.
    pub fn expected_commit(kind: CommitKind) -> Self {
        Self::ExpectedCommit { kind }
    }

    /// Wraps an error raised by a mutator.
    pub fn mutator(error: impl Into<BoxError>) -> Self {
        Self::Mutator(error.into())
    }

    /// Wraps an error raised by a lazy source.
    pub fn source(error: impl Into<BoxError>) -> Self {
        Self::Source(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CoreError::locked(HandleKind::Entity);
        assert_eq!(
            err.to_string(),
            "entity handle is locked: a later operation owns this chain"
        );

        let err = CoreError::locked(HandleKind::Entities);
        assert!(err.to_string().starts_with("entities handle is locked"));

        let err = CoreError::expected_commit(CommitKind::Update);
        assert_eq!(err.to_string(), "a pending update was never committed");

        assert_eq!(CoreError::NotFound.to_string(), "entity not found");
    }

    #[test]
    fn driver_error_is_not_wrapped() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = CoreError::Driver(Box::new(inner));
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn mutator_and_source_keep_the_cause() {
        let err = CoreError::mutator("bad input");
        assert_eq!(err.to_string(), "mutator error: bad input");

        let err = CoreError::source("connection reset");
        assert_eq!(err.to_string(), "source error: connection reset");
    }
}
