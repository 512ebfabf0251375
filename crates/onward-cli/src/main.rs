//! onward CLI
//!
//! Applies forward-only SQL migrations from a directory to a SQLite database

use clap::{Parser, Subcommand, ValueEnum};
use onward_core::logging_facility::{init, Profile};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "onward")]
#[command(about = "onward - forward-only SQL migrations", long_about = None)]
struct Cli {
    /// TOML file with ledger settings (`table`, `atomic`)
    #[arg(long, global = true, env = "ONWARD_CONFIG")]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Human)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending migrations
    Apply(commands::apply::ApplyArgs),
    /// Show the current version and pending migrations
    Status(commands::status::StatusArgs),
    /// List migrations recorded in the ledger
    History(commands::history::HistoryArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Human => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Apply(args) => commands::apply::execute(args, config),
        Commands::Status(args) => commands::status::execute(args, config),
        Commands::History(args) => commands::history::execute(args, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
