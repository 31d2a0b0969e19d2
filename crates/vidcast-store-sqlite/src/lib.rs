//! SQLite backend for the Vidcast social store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Because every call is serialised onto
//! that one connection, each multi-statement mutation is a single
//! `BEGIN IMMEDIATE` transaction and concurrent toggles never lose updates.

mod encode;
mod schema;
mod store;
mod toggle;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
