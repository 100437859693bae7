//! # Entiflow Store
//!
//! Store facade and driver contract for Entiflow.
//!
//! This crate provides:
//! - The query side of a driver ([`Reader`])
//! - The combined driver contract ([`Driver`])
//! - The [`Store`] facade wiring one driver into entity chains
//!
//! A store never talks to the driver eagerly: `find`, `read`,
//! `filter`, `create`, and `track` return lazy chains, and the driver
//! is consulted only when a chain is unwrapped.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod driver;
mod reader;
mod store;

pub use driver::Driver;
pub use reader::Reader;
pub use store::{Store, StoreSettings};
