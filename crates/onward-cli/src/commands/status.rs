//! Status command
//!
//! Usage: onward status --database <PATH> --migrations <DIR>

use super::DatabaseArgs;
use clap::Args;
use onward_store::{load_dir, sources, SqliteExecutor};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    /// Directory of `.sql` migration files
    #[arg(long, env = "ONWARD_MIGRATIONS")]
    pub migrations: PathBuf,
}

/// Execute status command
pub fn execute(
    args: StatusArgs,
    config_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let migrator = super::migrator(args.db.config(config_file)?);
    let records = sources::into_records(load_dir(&args.migrations)?);

    let conn = args.db.open()?;
    let status = migrator.status(&SqliteExecutor::new(&conn), &records)?;

    println!("Ledger: {}", status.table);
    println!("Current version: {}", status.current_version);
    println!("Known migrations: {}", status.total);
    if status.is_up_to_date() {
        println!("Up to date");
    } else {
        println!("Pending: {}", status.pending.len());
        for description in &status.pending {
            println!("  - {}", description);
        }
    }
    Ok(())
}
