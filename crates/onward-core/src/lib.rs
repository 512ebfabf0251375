//! onward core - forward-only SQL migrations
//!
//! This crate provides the migration engine and the seams it depends on:
//! - [`Dialect`]: statement templates for the version ledger
//! - [`Executor`]: the caller-owned SQL execution capability
//! - [`Record`]: one migration (description plus effect)
//! - [`Migrator`] / [`apply`]: apply pending records exactly once, in order
//! - Structured errors and the logging facility
//!
//! # Example
//!
//! ```ignore
//! use onward_core::{apply, sqlite3, Record};
//!
//! let migrations = vec![
//!     Record::sql("create people table", "CREATE TABLE people (name VARCHAR);"),
//!     Record::sql("insert a person", "INSERT INTO people VALUES ('Henry');"),
//! ];
//! apply(&executor, &sqlite3(), &migrations)?;
//! ```

pub mod config;
pub mod dialect;
pub mod engine;
pub mod errors;
pub mod executor;
pub mod ledger;
pub mod logging_facility;
pub mod record;

pub use onward_core_types as core_types;

// Re-export commonly used types
pub use config::{MigrateConfig, DEFAULT_TABLE};
pub use dialect::{sqlite3, Dialect, Sqlite3};
pub use engine::{apply, Migrator, Status};
pub use errors::{BoxError, ErrorKind, MigrateError, MigrationError, Result, StoreError};
pub use executor::{ExecSummary, Executor, FromValue, Row, Rows, Value};
pub use ledger::LedgerEntry;
pub use record::Record;
