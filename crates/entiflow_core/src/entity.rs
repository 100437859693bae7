//! Single-entity mutation engine.
//!
//! An [`Entity`] owns a lazy source plus an ordered chain of pending
//! steps (mutate, delete, commit). Fluent calls never execute
//! anything: they append to the chain and hand back a new handle,
//! while the receiver is permanently superseded. The terminal
//! [`Entity::unwrap`] resolves the source, folds the active steps
//! strictly in order, applies the commit policy, and returns the
//! final value.
//!
//! ## Handle protocol
//!
//! Handles are cheap aliases over one shared chain. Every fluent call
//! consumes `self`, checks that the handle still holds the current
//! generation, and advances it; a superseded alias fails with
//! [`CoreError::Locked`]. Cloning a handle therefore does not fork
//! the chain, it only creates an alias that dies as soon as any other
//! alias advances the chain.

use crate::assign::Assign;
use crate::config::{EngineCore, Settings, UnwrapOptions};
use crate::error::{BoxError, CoreError, CoreResult, HandleKind};
use crate::lazy::One;
use crate::status::{CommitKind, Status};
use crate::writer::write_status;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::{Mutex, MutexGuard};
use std::future::Future;
use std::sync::Arc;

pub(crate) type BoxMutator<T> =
    Box<dyn FnOnce(T) -> BoxFuture<'static, CoreResult<T>> + Send>;

/// Whether a chain starts from a fresh or an already-persisted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// The value was never persisted.
    Create,
    /// The value is the last known persisted state.
    Read,
}

impl Mode {
    fn status<T>(self, data: Option<T>) -> Status<T> {
        match data {
            None => Status::absent(),
            Some(data) => match self {
                Mode::Create => Status::created(data),
                Mode::Read => Status::read(data),
            },
        }
    }
}

/// A pending step of the mutation chain.
pub(crate) enum Step<T> {
    /// Applies a mutator to the current target.
    Mutate(BoxMutator<T>),
    /// Unconditionally clears the target.
    Delete,
    /// Checkpoints the accumulated diff through the driver.
    Commit,
}

struct EntityState<T, O>
where
    T: Send + Sync,
    O: Send + Sync,
{
    /// Handle generation; only the newest handle may act.
    generation: u64,
    /// Lazy source, consumed by the terminal unwrap.
    source: Option<One<T, O>>,
    mode: Mode,
    steps: Vec<Step<T>>,
    /// Number of active steps; undo moves it back, redo forward.
    cursor: usize,
    /// Oldest chain length still reachable by undo.
    floor: usize,
    core: EngineCore<T, O>,
}

/// A single-entity mutation chain.
///
/// Built by [`Entity::create`] or [`Entity::read`], extended through
/// the fluent methods, and resolved exactly once by
/// [`Entity::unwrap`].
pub struct Entity<T, O = ()>
where
    T: Send + Sync,
    O: Send + Sync,
{
    shared: Arc<Mutex<EntityState<T, O>>>,
    token: u64,
}

impl<T, O> Clone for Entity<T, O>
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

impl<T, O> std::fmt::Debug for Entity<T, O>
where
    T: Send + Sync,
    O: Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity").field("token", &self.token).finish()
    }
}

impl<T, O> Entity<T, O>
where
    T: Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    /// Starts a chain over a value that was never persisted.
    pub fn create(source: impl Into<One<T, O>>, settings: Settings<T, O>) -> Self {
        Self::with_steps(source.into(), Mode::Create, Vec::new(), settings.into_core())
    }

    /// Starts a chain over the last known persisted value.
    pub fn read(source: impl Into<One<T, O>>, settings: Settings<T, O>) -> Self {
        Self::with_steps(source.into(), Mode::Read, Vec::new(), settings.into_core())
    }

    pub(crate) fn with_steps(
        source: One<T, O>,
        mode: Mode,
        steps: Vec<Step<T>>,
        core: EngineCore<T, O>,
    ) -> Self {
        let cursor = steps.len();
        Self {
            shared: Arc::new(Mutex::new(EntityState {
                generation: 0,
                source: Some(source),
                mode,
                steps,
                cursor,
                floor: 0,
                core,
            })),
            token: 0,
        }
    }

    /// Validates this handle against the shared chain and supersedes
    /// it. The guard is never held across an await point.
    fn advance(&self) -> CoreResult<MutexGuard<'_, EntityState<T, O>>> {
        let mut state = self.shared.lock();
        if state.generation != self.token {
            return Err(CoreError::locked(HandleKind::Entity));
        }
        state.generation += 1;
        Ok(state)
    }

    fn push(self, step: Step<T>) -> CoreResult<Self> {
        let token = {
            let mut state = self.advance()?;
            let cursor = state.cursor;
            // Appending after an undo discards the redo tail.
            state.steps.truncate(cursor);
            state.steps.push(step);
            state.cursor += 1;
            if state.cursor - state.floor > state.core.history_size {
                state.floor = state.cursor - state.core.history_size;
            }
            state.generation
        };
        Ok(Self {
            shared: self.shared,
            token,
        })
    }

    /// Appends a mutator applied to the current target.
    ///
    /// Mutators are skipped while the entity is deleted.
    pub fn update<F>(self, mutator: F) -> CoreResult<Self>
    where
        F: FnOnce(T) -> T + Send + 'static,
    {
        self.push(Step::Mutate(Box::new(move |data| {
            futures::future::ready(Ok(mutator(data))).boxed()
        })))
    }

    /// Appends a fallible mutator.
    pub fn try_update<F, E>(self, mutator: F) -> CoreResult<Self>
    where
        F: FnOnce(T) -> Result<T, E> + Send + 'static,
        E: Into<BoxError>,
    {
        self.push(Step::Mutate(Box::new(move |data| {
            futures::future::ready(mutator(data).map_err(CoreError::mutator)).boxed()
        })))
    }

    /// Appends an asynchronous mutator.
    pub fn update_async<F, Fut, E>(self, mutator: F) -> CoreResult<Self>
    where
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        self.push(Step::Mutate(Box::new(move |data| {
            mutator(data)
                .map(|result| result.map_err(CoreError::mutator))
                .boxed()
        })))
    }

    /// Appends a shallow merge of `patch` into the current target.
    pub fn assign<P>(self, patch: P) -> CoreResult<Self>
    where
        T: Assign<P>,
        P: Send + 'static,
    {
        self.update(move |data| data.assign(patch))
    }

    /// Appends a step that deletes the entity, independent of prior
    /// steps.
    pub fn delete(self) -> CoreResult<Self> {
        self.push(Step::Delete)
    }

    /// Appends a checkpoint: when the chain resolves, the diff
    /// accumulated so far is written through the driver at this point,
    /// regardless of the auto-commit setting in force at unwrap.
    pub fn commit(self) -> CoreResult<Self> {
        self.push(Step::Commit)
    }

    /// Moves the history cursor back up to `steps` mutations, clamped
    /// to the oldest retained snapshot. `undo(0)` is a no-op;
    /// `undo(usize::MAX)` rewinds as far as history allows.
    pub fn undo(self, steps: usize) -> CoreResult<Self> {
        let token = {
            let mut state = self.advance()?;
            state.cursor = state.cursor.saturating_sub(steps).max(state.floor);
            state.generation
        };
        Ok(Self {
            shared: self.shared,
            token,
        })
    }

    /// Moves the history cursor forward over previously undone
    /// mutations, clamped to the end of the chain.
    pub fn redo(self, steps: usize) -> CoreResult<Self> {
        let token = {
            let mut state = self.advance()?;
            let limit = state.steps.len();
            state.cursor = state.cursor.saturating_add(steps).min(limit);
            state.generation
        };
        Ok(Self {
            shared: self.shared,
            token,
        })
    }

    /// Resolves the chain: extracts the source, folds every active
    /// step in order (each awaited before the next, since later steps
    /// observe the mutated target), then applies the commit policy.
    ///
    /// Returns the final value, or `None` when the entity was deleted
    /// or the source matched nothing.
    pub async fn unwrap(self, options: UnwrapOptions<O>) -> CoreResult<Option<T>> {
        let (source, mode, steps, core) = {
            let mut state = self.advance()?;
            let source = match state.source.take() {
                Some(source) => source,
                // The source is taken exactly once; a handle that got
                // this far with no source was already drained.
                None => return Err(CoreError::locked(HandleKind::Entity)),
            };
            let mut steps = std::mem::take(&mut state.steps);
            steps.truncate(state.cursor);
            (source, state.mode, steps, state.core.clone())
        };

        let driver_options = options.driver.clone();
        let initial = source.resolve(driver_options.clone()).await?;
        let mut status = mode.status(initial);

        for step in steps {
            match step {
                Step::Mutate(mutator) => {
                    // Mutators are skipped while the entity is deleted.
                    if let Some(target) = status.target.take() {
                        let next = mutator(Arc::unwrap_or_clone(target)).await?;
                        status = status.update(next);
                    }
                }
                Step::Delete => status = status.delete(),
                Step::Commit => {
                    status = write_status(core.writer.as_ref(), status, &driver_options).await?;
                }
            }
        }

        if status.should_commit() {
            let auto_commit = options.auto_commit.unwrap_or(core.auto_commit);
            let safe = options.safe.unwrap_or(core.safe);
            if auto_commit {
                status = write_status(core.writer.as_ref(), status, &driver_options).await?;
            } else if safe {
                let kind = status.kind().unwrap_or(CommitKind::Update);
                return Err(CoreError::expected_commit(kind));
            }
        }

        Ok(status.target.map(Arc::unwrap_or_clone))
    }
}
