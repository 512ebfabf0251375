//! Version ledger access
//!
//! Each function is a single statement round-trip through the executor.
//! The current version is never cached; it is re-read from the ledger on
//! every call.

use crate::dialect::Dialect;
use crate::errors::StoreError;
use crate::executor::{Executor, Value};
use chrono::{DateTime, Utc};

/// One row of the version ledger
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub id: i64,
    pub description: String,
    pub applied: Option<DateTime<Utc>>,
}

/// Probe for the ledger table
///
/// Any probe failure is read as "the table does not exist".
pub fn exists(executor: &dyn Executor, dialect: &dyn Dialect, table: &str) -> bool {
    match executor.query(&dialect.table_exists(table), &[]) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(table, error = %e, "ledger probe failed, treating table as absent");
            false
        }
    }
}

/// Create the ledger table
pub fn create(
    executor: &dyn Executor,
    dialect: &dyn Dialect,
    table: &str,
) -> Result<(), StoreError> {
    executor.execute(&dialect.create_table(table), &[])?;
    tracing::debug!(table, "created version ledger");
    Ok(())
}

/// Create the ledger table unless the probe finds it
///
/// Returns `true` when the table was created.
pub fn initialize(
    executor: &dyn Executor,
    dialect: &dyn Dialect,
    table: &str,
) -> Result<bool, StoreError> {
    if exists(executor, dialect, table) {
        return Ok(false);
    }
    create(executor, dialect, table)?;
    Ok(true)
}

/// Read the current version: the id of the newest ledger row, or 0 when the
/// ledger is empty
pub fn current_version(
    executor: &dyn Executor,
    dialect: &dyn Dialect,
    table: &str,
) -> Result<i64, StoreError> {
    let mut rows = executor.query(&dialect.check_version(table), &[])?;
    match rows.next() {
        Some(row) => row.get::<i64>(0),
        None => Ok(0),
    }
}

/// Append a ledger row for a successfully applied migration
pub fn record(
    executor: &dyn Executor,
    dialect: &dyn Dialect,
    table: &str,
    description: &str,
    applied: DateTime<Utc>,
) -> Result<(), StoreError> {
    executor.execute(
        &dialect.insert_version(table),
        &[Value::from(description), Value::Timestamp(applied)],
    )?;
    Ok(())
}

/// Read every ledger row, oldest first
pub fn entries(
    executor: &dyn Executor,
    dialect: &dyn Dialect,
    table: &str,
) -> Result<Vec<LedgerEntry>, StoreError> {
    executor
        .query(&dialect.list_versions(table), &[])?
        .map(|row| {
            Ok(LedgerEntry {
                id: row.get(0)?,
                description: row.get::<Option<String>>(1)?.unwrap_or_default(),
                applied: row.get(2)?,
            })
        })
        .collect()
}
