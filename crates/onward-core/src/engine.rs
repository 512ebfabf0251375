//! Migration engine
//!
//! Applies an ordered list of [`Record`]s exactly once each:
//!
//! 1. create the version ledger if the probe cannot find it,
//! 2. read the current version from the ledger,
//! 3. skip that many leading records,
//! 4. run each remaining record and append its ledger row, stopping at the
//!    first failure.
//!
//! Pending work is always derived from the ledger, so calling
//! [`Migrator::apply`] again after a failure resumes at the first
//! unapplied record. Concurrent runs against one database are not
//! coordinated: the version read and the ledger insert are separate
//! round-trips.
//!
//! ## Logging Ownership
//!
//! `apply_migrations` is logged here with `log_op_start!`, `log_op_end!` and
//! `log_op_error!`. The ledger module only emits debug events.

use crate::config::MigrateConfig;
use crate::dialect::Dialect;
use crate::errors::{BoxError, MigrateError, MigrationError, Result};
use crate::executor::Executor;
use crate::ledger::{self, LedgerEntry};
use crate::record::Record;
use crate::{log_op_end, log_op_error, log_op_start};
use chrono::Utc;
use std::time::Instant;

/// Apply `migrations` using the default configuration (ledger table
/// `dbversion`, no per-migration transactions)
///
/// # Errors
///
/// See [`Migrator::apply`].
pub fn apply(
    executor: &dyn Executor,
    dialect: &dyn Dialect,
    migrations: &[Record],
) -> Result<()> {
    Migrator::new(dialect).apply(executor, migrations)
}

/// Snapshot of how far a migration list has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub table: String,
    pub current_version: i64,
    pub total: usize,
    /// Descriptions of records not yet applied, in application order
    pub pending: Vec<String>,
}

impl Status {
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Migration engine bound to a dialect and configuration
#[derive(Clone)]
pub struct Migrator<'d> {
    dialect: &'d dyn Dialect,
    config: MigrateConfig,
}

impl<'d> Migrator<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            config: MigrateConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MigrateConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.config.table = table.into();
        self
    }

    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.config.atomic = atomic;
        self
    }

    pub fn config(&self) -> &MigrateConfig {
        &self.config
    }

    /// Apply every record not yet recorded in the ledger, in list order
    ///
    /// # Errors
    ///
    /// - `Config`: the ledger table name is invalid
    /// - `Initialize`: the ledger was absent and could not be created
    /// - `VersionRead`: the current version could not be read
    /// - `Migration`: a record's effect or its ledger insert failed; the
    ///   wrapped cause is the error the effect returned
    pub fn apply(&self, executor: &dyn Executor, migrations: &[Record]) -> Result<()> {
        log_op_start!(
            "apply_migrations",
            table = self.config.table.as_str(),
            total = migrations.len()
        );
        let start = Instant::now();

        match self.apply_impl(executor, migrations) {
            Ok((version, applied)) => {
                log_op_end!(
                    "apply_migrations",
                    duration_ms = start.elapsed().as_millis() as u64,
                    table = self.config.table.as_str(),
                    version = version,
                    applied = applied
                );
                Ok(())
            }
            Err(e) => {
                log_op_error!(
                    "apply_migrations",
                    e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    table = self.config.table.as_str()
                );
                Err(e)
            }
        }
    }

    /// Returns the final version and how many records this run applied
    fn apply_impl(&self, executor: &dyn Executor, migrations: &[Record]) -> Result<(i64, usize)> {
        self.config.validate()?;
        let table = self.config.table.as_str();

        ledger::initialize(executor, self.dialect, table).map_err(MigrateError::Initialize)?;
        let mut version = ledger::current_version(executor, self.dialect, table)
            .map_err(MigrateError::VersionRead)?;

        let pending = pending(migrations, version);
        tracing::debug!(table, version, pending = pending.len(), "resolved pending migrations");

        for record in pending {
            let target = version + 1;
            self.apply_one(executor, record)
                .map_err(|cause| MigrationError::new(record.description(), target, cause))?;
            version = target;
            tracing::info!(
                table,
                version,
                description = record.description(),
                "applied migration"
            );
        }

        Ok((version, pending.len()))
    }

    fn apply_one(
        &self,
        executor: &dyn Executor,
        record: &Record,
    ) -> std::result::Result<(), BoxError> {
        if self.config.atomic {
            executor.with_transaction(&mut |tx: &dyn Executor| self.run_and_record(tx, record))
        } else {
            self.run_and_record(executor, record)
        }
    }

    fn run_and_record(
        &self,
        executor: &dyn Executor,
        record: &Record,
    ) -> std::result::Result<(), BoxError> {
        record.run(executor)?;
        ledger::record(
            executor,
            self.dialect,
            &self.config.table,
            record.description(),
            Utc::now(),
        )?;
        Ok(())
    }

    /// Current ledger version, 0 when the ledger does not exist yet
    ///
    /// Never creates the ledger.
    ///
    /// # Errors
    ///
    /// - `Config`: the ledger table name is invalid
    /// - `VersionRead`: the ledger exists but could not be read
    pub fn current_version(&self, executor: &dyn Executor) -> Result<i64> {
        self.config.validate()?;
        let table = self.config.table.as_str();
        if !ledger::exists(executor, self.dialect, table) {
            return Ok(0);
        }
        ledger::current_version(executor, self.dialect, table).map_err(MigrateError::VersionRead)
    }

    /// Compare `migrations` against the ledger without applying anything
    ///
    /// # Errors
    ///
    /// Same as [`Migrator::current_version`].
    pub fn status(&self, executor: &dyn Executor, migrations: &[Record]) -> Result<Status> {
        let current_version = self.current_version(executor)?;
        Ok(Status {
            table: self.config.table.clone(),
            current_version,
            total: migrations.len(),
            pending: pending(migrations, current_version)
                .iter()
                .map(|r| r.description().to_string())
                .collect(),
        })
    }

    /// Every ledger row, oldest first; empty when the ledger does not exist
    ///
    /// # Errors
    ///
    /// - `Config`: the ledger table name is invalid
    /// - `Store`: the ledger rows could not be read
    pub fn history(&self, executor: &dyn Executor) -> Result<Vec<LedgerEntry>> {
        self.config.validate()?;
        let table = self.config.table.as_str();
        if !ledger::exists(executor, self.dialect, table) {
            return Ok(Vec::new());
        }
        ledger::entries(executor, self.dialect, table).map_err(MigrateError::Store)
    }
}

/// Records after the first `version` entries
fn pending(migrations: &[Record], version: i64) -> &[Record] {
    let skip = usize::try_from(version.max(0)).unwrap_or(usize::MAX);
    migrations.get(skip..).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::new(format!("m{}", i), |_: &dyn Executor| Ok(())))
            .collect()
    }

    #[test]
    fn test_pending_skips_applied() {
        let list = records(3);
        let rest = pending(&list, 1);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].description(), "m1");
    }

    #[test]
    fn test_pending_empty_when_version_exceeds_list() {
        let list = records(2);
        assert!(pending(&list, 2).is_empty());
        assert!(pending(&list, 5).is_empty());
    }

    #[test]
    fn test_pending_negative_version_is_zero() {
        let list = records(2);
        assert_eq!(pending(&list, -1).len(), 2);
    }

    #[test]
    fn test_status_up_to_date() {
        let status = Status {
            table: "dbversion".to_string(),
            current_version: 2,
            total: 2,
            pending: Vec::new(),
        };
        assert!(status.is_up_to_date());
    }
}
