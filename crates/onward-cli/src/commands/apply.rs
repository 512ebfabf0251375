//! Apply command
//!
//! Usage: onward apply --database <PATH> --migrations <DIR> [--table T] [--atomic]

use super::DatabaseArgs;
use clap::Args;
use onward_store::{load_dir, sources, SqliteExecutor};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    /// Directory of `.sql` migration files
    #[arg(long, env = "ONWARD_MIGRATIONS")]
    pub migrations: PathBuf,
}

/// Execute apply command
pub fn execute(
    args: ApplyArgs,
    config_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let migrator = super::migrator(args.db.config(config_file)?);
    let records = sources::into_records(load_dir(&args.migrations)?);

    let conn = args.db.open()?;
    let executor = SqliteExecutor::new(&conn);
    migrator.apply(&executor, &records)?;

    let version = migrator.current_version(&executor)?;
    println!(
        "Database at version {} of {} ({})",
        version,
        records.len(),
        migrator.config().table
    );
    Ok(())
}
