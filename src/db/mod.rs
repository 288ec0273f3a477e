//! Database module
//!
//! Handles SQLite connection pooling, migrations and column mappings.

pub mod connection;
pub mod migrations;
mod types;

pub use connection::{Database, DbError, DbResult};
