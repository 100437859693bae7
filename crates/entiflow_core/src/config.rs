//! Engine settings and call-time options.

use crate::writer::{NoopWriter, Writer};
use std::sync::Arc;

/// Default number of retained undo snapshots.
pub const DEFAULT_HISTORY_SIZE: usize = 10;

/// Default number of item pipelines in flight during a plural unwrap.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Instance-level defaults supplied when an engine is constructed.
pub struct Settings<T, O = ()>
where
    T: Send + Sync,
    O: Send + Sync,
{
    /// Whether unwrap commits pending changes implicitly.
    pub auto_commit: bool,
    /// Whether skipping a pending commit is an error when auto-commit
    /// is off.
    pub safe: bool,
    /// Maximum number of retained undo snapshots; oldest are evicted.
    pub history_size: usize,
    /// Driver used to persist the net change. `None` means no-op.
    pub writer: Option<Arc<dyn Writer<T, O>>>,
}

impl<T, O> Default for Settings<T, O>
where
    T: Send + Sync,
    O: Send + Sync,
{
    fn default() -> Self {
        Self {
            auto_commit: true,
            safe: true,
            history_size: DEFAULT_HISTORY_SIZE,
            writer: None,
        }
    }
}

impl<T, O> Clone for Settings<T, O>
where
    T: Send + Sync,
    O: Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            auto_commit: self.auto_commit,
            safe: self.safe,
            history_size: self.history_size,
            writer: self.writer.clone(),
        }
    }
}

impl<T, O> Settings<T, O>
where
    T: Send + Sync,
    O: Send + Sync,
{
    /// Creates settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether unwrap commits implicitly.
    #[must_use]
    pub fn auto_commit(mut self, value: bool) -> Self {
        self.auto_commit = value;
        self
    }

    /// Sets whether a skipped pending commit is an error.
    #[must_use]
    pub fn safe(mut self, value: bool) -> Self {
        self.safe = value;
        self
    }

    /// Sets the maximum number of retained undo snapshots.
    #[must_use]
    pub fn history_size(mut self, value: usize) -> Self {
        self.history_size = value;
        self
    }

    /// Sets the driver used to persist changes.
    #[must_use]
    pub fn writer(mut self, writer: Arc<dyn Writer<T, O>>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub(crate) fn into_core(self) -> EngineCore<T, O> {
        EngineCore {
            auto_commit: self.auto_commit,
            safe: self.safe,
            history_size: self.history_size,
            writer: self.writer.unwrap_or_else(|| Arc::new(NoopWriter)),
        }
    }
}

impl<T, O> std::fmt::Debug for Settings<T, O>
where
    T: Send + Sync,
    O: Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("auto_commit", &self.auto_commit)
            .field("safe", &self.safe)
            .field("history_size", &self.history_size)
            .field("writer", &self.writer.is_some())
            .finish()
    }
}

/// Resolved engine configuration shared by every handle of one chain.
pub(crate) struct EngineCore<T, O>
where
    T: Send + Sync,
    O: Send + Sync,
{
    pub(crate) auto_commit: bool,
    pub(crate) safe: bool,
    pub(crate) history_size: usize,
    pub(crate) writer: Arc<dyn Writer<T, O>>,
}

impl<T, O> Clone for EngineCore<T, O>
where
    T: Send + Sync,
    O: Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            auto_commit: self.auto_commit,
            safe: self.safe,
            history_size: self.history_size,
            writer: Arc::clone(&self.writer),
        }
    }
}

/// Call-time options for a single-entity unwrap.
///
/// Explicit fields override the instance defaults; `driver` is passed
/// through to every driver call untouched.
#[derive(Debug, Clone)]
pub struct UnwrapOptions<O = ()> {
    /// Overrides the instance auto-commit default when set.
    pub auto_commit: Option<bool>,
    /// Overrides the instance safe-mode default when set.
    pub safe: Option<bool>,
    /// Driver-specific passthrough options.
    pub driver: O,
}

impl<O: Default> Default for UnwrapOptions<O> {
    fn default() -> Self {
        Self {
            auto_commit: None,
            safe: None,
            driver: O::default(),
        }
    }
}

impl<O> UnwrapOptions<O> {
    /// Creates options with the given driver passthrough.
    pub fn with_driver(driver: O) -> Self {
        Self {
            auto_commit: None,
            safe: None,
            driver,
        }
    }

    /// Overrides the auto-commit default.
    #[must_use]
    pub fn auto_commit(mut self, value: bool) -> Self {
        self.auto_commit = Some(value);
        self
    }

    /// Overrides the safe-mode default.
    #[must_use]
    pub fn safe(mut self, value: bool) -> Self {
        self.safe = Some(value);
        self
    }
}

/// Call-time options for a plural unwrap.
#[derive(Debug, Clone)]
pub struct StreamOptions<O = ()> {
    /// Maximum number of item pipelines in flight; order of results is
    /// unaffected.
    pub concurrency: Option<usize>,
    /// Overrides the instance auto-commit default when set.
    pub auto_commit: Option<bool>,
    /// Overrides the instance safe-mode default when set.
    pub safe: Option<bool>,
    /// Driver-specific passthrough options.
    pub driver: O,
}

impl<O: Default> Default for StreamOptions<O> {
    fn default() -> Self {
        Self {
            concurrency: None,
            auto_commit: None,
            safe: None,
            driver: O::default(),
        }
    }
}

impl<O> StreamOptions<O> {
    /// Creates options with the given driver passthrough.
    pub fn with_driver(driver: O) -> Self {
        Self {
            concurrency: None,
            auto_commit: None,
            safe: None,
            driver,
        }
    }

    /// Sets the maximum number of item pipelines in flight.
    #[must_use]
    pub fn concurrency(mut self, value: usize) -> Self {
        self.concurrency = Some(value);
        self
    }

    /// Overrides the auto-commit default.
    #[must_use]
    pub fn auto_commit(mut self, value: bool) -> Self {
        self.auto_commit = Some(value);
        self
    }

    /// Overrides the safe-mode default.
    #[must_use]
    pub fn safe(mut self, value: bool) -> Self {
        self.safe = Some(value);
        self
    }

    /// The single-entity options applied to each item.
    pub(crate) fn unwrap_options(&self) -> UnwrapOptions<O>
    where
        O: Clone,
    {
        UnwrapOptions {
            auto_commit: self.auto_commit,
            safe: self.safe,
            driver: self.driver.clone(),
        }
    }
}
