//! onward store - SQLite backend for the migration engine
//!
//! Provides:
//! - [`SqliteExecutor`]: the engine's execution capability over rusqlite
//! - Connection helpers (`db`)
//! - Migrations loaded from `.sql` files (`sources`)

pub mod db;
pub mod errors;
pub mod executor;
pub mod sources;

// Re-export key types
pub use executor::SqliteExecutor;
pub use sources::{load_dir, SqlMigration};
