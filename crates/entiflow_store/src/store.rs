//! Store facade.

use crate::driver::{Driver, DriverWriter};
use entiflow_core::{
    CoreError, Entities, Entity, Many, One, Settings, DEFAULT_HISTORY_SIZE,
};
use futures::StreamExt;
use std::sync::Arc;

/// Store-level defaults applied to every chain it creates.
#[derive(Debug, Clone, Copy)]
pub struct StoreSettings {
    /// Whether unwrap commits pending changes implicitly.
    pub auto_commit: bool,
    /// Whether skipping a pending commit is an error when auto-commit
    /// is off.
    pub safe: bool,
    /// Maximum number of retained undo snapshots per chain.
    pub history_size: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            auto_commit: true,
            safe: true,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

impl StoreSettings {
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
}

/// Convenience constructors wiring one driver into entity chains.
///
/// A store holds a shared driver plus chain defaults. Its methods are
/// all lazy: nothing touches the driver until the returned chain is
/// unwrapped.
pub struct Store<T, Q, O = ()>
where
    T: Send + Sync + 'static,
    Q: Send + Sync,
    O: Send + Sync,
{
    driver: Arc<dyn Driver<T, Q, O>>,
    settings: StoreSettings,
}

impl<T, Q, O> Clone for Store<T, Q, O>
where
    T: Send + Sync + 'static,
    Q: Send + Sync,
    O: Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            settings: self.settings,
        }
    }
}

impl<T, Q, O> std::fmt::Debug for Store<T, Q, O>
where
    T: Send + Sync + 'static,
    Q: Send + Sync,
    O: Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<T, Q, O> Store<T, Q, O>
where
    T: Clone + Send + Sync + 'static,
    Q: Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    /// Creates a store over the given driver with default settings.
    pub fn new<D>(driver: D) -> Self
    where
        D: Driver<T, Q, O> + 'static,
    {
        Self::with_settings(driver, StoreSettings::default())
    }

    /// Creates a store over the given driver and settings.
    pub fn with_settings<D>(driver: D, settings: StoreSettings) -> Self
    where
        D: Driver<T, Q, O> + 'static,
    {
        Self::from_shared(Arc::new(driver), settings)
    }

    /// Creates a store over an already-shared driver, useful when the
    /// caller keeps a handle on the driver for its own purposes.
    pub fn from_shared(driver: Arc<dyn Driver<T, Q, O>>, settings: StoreSettings) -> Self {
        Self { driver, settings }
    }

    fn chain_settings(&self) -> Settings<T, O> {
        Settings::new()
            .auto_commit(self.settings.auto_commit)
            .safe(self.settings.safe)
            .history_size(self.settings.history_size)
            .writer(Arc::new(DriverWriter(Arc::clone(&self.driver))))
    }

    /// Chain over the entity matching `query`, if any.
    ///
    /// Unwraps to `None` when nothing matches.
    pub fn find(&self, query: Q) -> Entity<T, O> {
        let driver = Arc::clone(&self.driver);
        let source = One::produce(move |options: O| async move {
            driver
                .find(&query, &options)
                .await
                .map_err(CoreError::Source)
        });
        Entity::read(source, self.chain_settings())
    }

    /// Chain over the entity matching `query`.
    ///
    /// Unwrapping fails with [`CoreError::NotFound`] when nothing
    /// matches.
    pub fn read(&self, query: Q) -> Entity<T, O> {
        let driver = Arc::clone(&self.driver);
        let source = One::produce(move |options: O| async move {
            match driver.find(&query, &options).await {
                Ok(Some(data)) => Ok(Some(data)),
                Ok(None) => Err(CoreError::NotFound),
                Err(error) => Err(CoreError::Source(error)),
            }
        });
        Entity::read(source, self.chain_settings())
    }

    /// Pipeline over every entity matching `query`.
    pub fn filter(&self, query: Q) -> Entities<T, O> {
        let driver = Arc::clone(&self.driver);
        let source = Many::produce(move |options: O| {
            driver
                .filter(&query, &options)
                .map(|item| item.map_err(CoreError::Source))
        });
        Entities::read(source, self.chain_settings())
    }

    /// Chain over a value that was never persisted.
    pub fn create(&self, data: T) -> Entity<T, O> {
        Entity::create(data, self.chain_settings())
    }

    /// Pipeline over values that were never persisted.
    pub fn create_many<I>(&self, data: I) -> Entities<T, O>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Entities::create(Many::items(data), self.chain_settings())
    }

    /// Chain over a value already known to be persisted.
    pub fn track(&self, data: T) -> Entity<T, O> {
        Entity::read(data, self.chain_settings())
    }

    /// Pipeline over values already known to be persisted.
    pub fn track_many<I>(&self, data: I) -> Entities<T, O>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Entities::read(Many::items(data), self.chain_settings())
    }
}
