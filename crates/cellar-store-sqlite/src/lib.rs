//! SQLite backend for the Cellar whiskey store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::LATEST_VERSION;
pub use store::{Location, SqliteStore, StoreOptions};

#[cfg(test)]
mod tests;
