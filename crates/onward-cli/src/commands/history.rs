//! History command
//!
//! Usage: onward history --database <PATH>

use super::DatabaseArgs;
use clap::Args;
use onward_store::SqliteExecutor;
use std::path::Path;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Execute history command
pub fn execute(
    args: HistoryArgs,
    config_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let migrator = super::migrator(args.db.config(config_file)?);
    let conn = args.db.open()?;
    let entries = migrator.history(&SqliteExecutor::new(&conn))?;

    if entries.is_empty() {
        println!("No migrations applied");
        return Ok(());
    }
    for entry in entries {
        let applied = entry
            .applied
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!("{:>4}  {}  {}", entry.id, applied, entry.description);
    }
    Ok(())
}
