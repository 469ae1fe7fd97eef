//! backup-cli: full SQL dumps and CSV exports from the command line
//!
//! Connection settings come from the environment (a `.env` file in the working
//! directory is loaded first): `mysql_host`, `mysql_port`, `mysql_user`,
//! `mysql_password`, `mysql_database`, and `BACKUP_DB_TYPE` to select SQLite.

use clap::{Parser, Subcommand};
use rust_backup_system::core::{BackupError, BackupSettings, ConnectionConfig, ErrorKind};
use rust_backup_system::engine::DumpOptions;
use rust_backup_system::operations::{available_tables, export_table, full_backup};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "backup-cli", version, about = "Database dump and CSV export")]
struct Cli {
    /// Directory artifacts are written to (default: $BACKUP_DIR or ./backups)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the tables available for export
    Tables,
    /// Write a full SQL dump of the database
    Dump {
        /// Read all tables inside one consistent snapshot
        #[arg(long)]
        snapshot: bool,
    },
    /// Export one table to CSV
    Export {
        /// Exact table name, as printed by `tables`
        table: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", label(e.kind()), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), BackupError> {
    let config = ConnectionConfig::from_env()?;
    let settings = match cli.output_dir {
        Some(output_dir) => BackupSettings { output_dir },
        None => BackupSettings::from_env(),
    };

    match cli.command {
        Command::Tables => {
            let tables = available_tables(&config).await?;
            if cli.json {
                print_json(&tables);
            } else {
                println!("--- Available tables ---");
                for table in &tables {
                    println!(" - {}", table);
                }
                println!("------------------------");
            }
        }
        Command::Dump { snapshot } => {
            let options = DumpOptions {
                consistent_snapshot: snapshot,
            };
            let artifact = full_backup(&config, &settings, options).await?;
            if cli.json {
                print_json(&artifact);
            } else {
                for table in &artifact.tables {
                    println!("  {:<32} {:>10} rows", table.name, table.rows);
                }
                println!("Backup written: {}", artifact.path.display());
            }
        }
        Command::Export { table } => {
            let artifact = export_table(&config, &settings, &table).await?;
            if cli.json {
                print_json(&artifact);
            } else {
                println!(
                    "Export written: {} ({} rows)",
                    artifact.path.display(),
                    artifact.rows
                );
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::warn!(error = %e, "could not serialize result"),
    }
}

fn label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::ConnectionFailure => "connection failure",
        ErrorKind::QueryFailure => "query failure",
        ErrorKind::UnknownTable => "unknown table",
        ErrorKind::WriteFailure => "write failure",
        ErrorKind::InvalidConfig => "configuration error",
        ErrorKind::UnsupportedDatabase => "unsupported database",
    }
}
