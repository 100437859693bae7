//! # Entiflow Core
//!
//! Core entity mutation engine for Entiflow.
//!
//! This crate provides:
//! - Immutable mutation chains over a single entity ([`Entity`])
//! - Streaming pipelines over sequences of entities ([`Entities`])
//! - Lazy value and stream sources ([`One`], [`Many`])
//! - The driver write contract ([`Writer`]) and commit dispatch
//! - Undo/redo over declared mutations
//!
//! ## Architecture
//!
//! Entiflow is a unit-of-work layer between application code and an
//! arbitrary storage backend. A chain is **declared** through fluent
//! calls that record steps without executing anything, and **resolved**
//! exactly once by `unwrap`, which folds the steps over a
//! `{source, target}` status snapshot and persists the net change
//! through the configured driver.
//!
//! ## Key Invariants
//!
//! - Steps run strictly in order; later steps observe earlier results
//! - A handle is superseded by every fluent call; only the newest may act
//! - The dirty check is reference identity, never structural equality
//! - Driver errors surface unmodified and are never retried
//! - Streaming results keep input order regardless of concurrency

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod assign;
mod config;
mod entities;
mod entity;
mod error;
mod lazy;
mod status;
mod writer;

pub use assign::Assign;
pub use config::{Settings, StreamOptions, UnwrapOptions, DEFAULT_CONCURRENCY, DEFAULT_HISTORY_SIZE};
pub use entities::Entities;
pub use entity::Entity;
pub use error::{BoxError, CoreError, CoreResult, HandleKind};
pub use lazy::{Many, One};
pub use status::{CommitKind, Status};
pub use writer::Writer;
