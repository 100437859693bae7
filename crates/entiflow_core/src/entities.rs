//! Streaming plural mutation engine.
//!
//! [`Entities`] applies the single-entity protocol to every item of a
//! lazy sequence. Fluent calls record the transformation once as a
//! per-item mapping, so building a pipeline costs the same for three
//! items or a million; the work happens per item during the terminal
//! [`Entities::unwrap`], which drains the stream with bounded
//! concurrency while reporting results in input order.

use crate::assign::Assign;
use crate::config::{EngineCore, Settings, StreamOptions, DEFAULT_CONCURRENCY};
use crate::entity::{Entity, Mode, Step};
use crate::error::{BoxError, CoreError, CoreResult, HandleKind};
use crate::lazy::{Many, One};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt, TryStreamExt};
use parking_lot::{Mutex, MutexGuard};
use std::future::Future;
use std::sync::Arc;

type SharedMutator<T> =
    Arc<dyn Fn(T) -> BoxFuture<'static, CoreResult<T>> + Send + Sync>;

/// A recorded fluent operation, replayed for every drained item.
enum Op<T> {
    Mutate(SharedMutator<T>),
    Delete,
    Commit,
}

impl<T: 'static> Op<T> {
    fn step(&self) -> Step<T> {
        match self {
            Op::Mutate(mutator) => {
                let mutator = Arc::clone(mutator);
                Step::Mutate(Box::new(move |data| mutator(data)))
            }
            Op::Delete => Step::Delete,
            Op::Commit => Step::Commit,
        }
    }
}

struct EntitiesState<T, O>
where
    T: Send + Sync,
    O: Send + Sync,
{
    /// Handle generation; only the newest handle may act.
    generation: u64,
    /// Lazy stream source, consumed by the terminal unwrap.
    many: Option<Many<T, O>>,
    mode: Mode,
    ops: Vec<Op<T>>,
    core: EngineCore<T, O>,
}

/// A mutation pipeline over a stream of entities.
///
/// Built by [`Entities::create`] or [`Entities::read`], extended
/// through the fluent methods, and drained exactly once by
/// [`Entities::unwrap`]. Handles follow the same alias-and-supersede
/// protocol as [`Entity`].
pub struct Entities<T, O = ()>
where
    T: Send + Sync,
    O: Send + Sync,
{
    shared: Arc<Mutex<EntitiesState<T, O>>>,
    token: u64,
}

impl<T, O> Clone for Entities<T, O>
where
    T: Send + Sync,
    O: Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            token: self.token,
        }
    }
}

impl<T, O> std::fmt::Debug for Entities<T, O>
where
    T: Send + Sync,
    O: Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entities")
            .field("token", &self.token)
            .finish()
    }
}

impl<T, O> Entities<T, O>
where
    T: Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    /// Starts a pipeline over items that were never persisted.
    pub fn create(source: impl Into<Many<T, O>>, settings: Settings<T, O>) -> Self {
        Self::with_mode(source.into(), Mode::Create, settings)
    }

    /// Starts a pipeline over items read from storage.
    pub fn read(source: impl Into<Many<T, O>>, settings: Settings<T, O>) -> Self {
        Self::with_mode(source.into(), Mode::Read, settings)
    }

    fn with_mode(many: Many<T, O>, mode: Mode, settings: Settings<T, O>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(EntitiesState {
                generation: 0,
                many: Some(many),
                mode,
                ops: Vec::new(),
                core: settings.into_core(),
            })),
            token: 0,
        }
    }

    fn advance(&self) -> CoreResult<MutexGuard<'_, EntitiesState<T, O>>> {
        let mut state = self.shared.lock();
        if state.generation != self.token {
            return Err(CoreError::locked(HandleKind::Entities));
        }
        state.generation += 1;
        Ok(state)
    }

    fn push(self, op: Op<T>) -> CoreResult<Self> {
        let token = {
            let mut state = self.advance()?;
            state.ops.push(op);
            state.generation
        };
        Ok(Self {
            shared: self.shared,
            token,
        })
    }

    /// Appends a mutator applied to every drained item.
    pub fn update<F>(self, mutator: F) -> CoreResult<Self>
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.push(Op::Mutate(Arc::new(move |data| {
            futures::future::ready(Ok(mutator(data))).boxed()
        })))
    }

    /// Appends a fallible mutator applied to every drained item.
    pub fn try_update<F, E>(self, mutator: F) -> CoreResult<Self>
    where
        F: Fn(T) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.push(Op::Mutate(Arc::new(move |data| {
            futures::future::ready(mutator(data).map_err(CoreError::mutator)).boxed()
        })))
    }

    /// Appends an asynchronous mutator applied to every drained item.
    pub fn update_async<F, Fut, E>(self, mutator: F) -> CoreResult<Self>
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        self.push(Op::Mutate(Arc::new(move |data| {
            mutator(data)
                .map(|result| result.map_err(CoreError::mutator))
                .boxed()
        })))
    }

    /// Appends a shallow merge of `patch` into every drained item.
    pub fn assign<P>(self, patch: P) -> CoreResult<Self>
    where
        T: Assign<P>,
        P: Clone + Send + Sync + 'static,
    {
        self.update(move |data| data.assign(patch.clone()))
    }

    /// Appends a delete step for every drained item.
    pub fn delete(self) -> CoreResult<Self> {
        self.push(Op::Delete)
    }

    /// Appends a checkpoint step for every drained item.
    pub fn commit(self) -> CoreResult<Self> {
        self.push(Op::Commit)
    }

    /// Drains the stream, resolving every item through its own entity
    /// chain, and collects the results in input order.
    ///
    /// Up to `concurrency` item pipelines run at once (default one at
    /// a time); concurrency affects only when work completes, never
    /// the order of the returned vector. The first item failure aborts
    /// the drain and no partial results are returned.
    pub async fn unwrap(self, options: StreamOptions<O>) -> CoreResult<Vec<Option<T>>> {
        let (many, mode, ops, core) = {
            let mut state = self.advance()?;
            let many = match state.many.take() {
                Some(many) => many,
                // The stream is taken exactly once; a handle that got
                // this far with no stream was already drained.
                None => return Err(CoreError::locked(HandleKind::Entities)),
            };
            let ops = std::mem::take(&mut state.ops);
            (many, state.mode, ops, state.core.clone())
        };

        let concurrency = options.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1);
        let item_options = options.unwrap_options();
        let ops = Arc::new(ops);

        many.resolve(item_options.driver.clone())
            .map(move |item| {
                let ops = Arc::clone(&ops);
                let core = core.clone();
                let options = item_options.clone();
                async move {
                    let data = item?;
                    let steps = ops.iter().map(Op::step).collect();
                    Entity::with_steps(One::ready(data), mode, steps, core)
                        .unwrap(options)
                        .await
                }
            })
            .buffered(concurrency)
            .try_collect()
            .await
    }
}
