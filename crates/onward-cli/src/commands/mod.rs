//! CLI command implementations

pub mod apply;
pub mod history;
pub mod status;

use clap::Args;
use onward_core::{MigrateConfig, Migrator, Sqlite3};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Database and ledger options shared by every command
#[derive(Debug, Args)]
pub struct DatabaseArgs {
    /// Path to the SQLite database file
    #[arg(long, env = "ONWARD_DATABASE")]
    pub database: PathBuf,

    /// Ledger table name (overrides the config file)
    #[arg(long, env = "ONWARD_TABLE")]
    pub table: Option<String>,

    /// Run each migration and its ledger row in one transaction
    #[arg(long, env = "ONWARD_ATOMIC")]
    pub atomic: bool,
}

impl DatabaseArgs {
    /// Merge the optional config file with command-line overrides
    pub fn config(
        &self,
        config_file: Option<&Path>,
    ) -> Result<MigrateConfig, Box<dyn std::error::Error>> {
        let mut config = match config_file {
            Some(path) => MigrateConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => MigrateConfig::default(),
        };
        if let Some(table) = &self.table {
            config.table = table.clone();
        }
        if self.atomic {
            config.atomic = true;
        }
        Ok(config)
    }

    /// Open and configure the database connection
    pub fn open(&self) -> Result<Connection, Box<dyn std::error::Error>> {
        let conn = onward_store::db::open(&self.database)?;
        onward_store::db::configure(&conn)?;
        Ok(conn)
    }
}

/// Build a migrator for the SQLite dialect
pub fn migrator(config: MigrateConfig) -> Migrator<'static> {
    Migrator::new(&Sqlite3).with_config(config)
}
