//! Core types and trait definitions for the Cellar whiskey inventory.
//!
//! This crate is deliberately free of terminal and database dependencies.
//! The store backend and the UI depend on it; it depends on neither.

pub mod error;
pub mod form;
pub mod id;
pub mod list;
pub mod range;
pub mod seed;
pub mod store;
pub mod whiskey;

pub use error::{Error, Result};
