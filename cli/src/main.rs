//! Loglink CLI
//!
//! Offline inspection of the structured request log written by the API server.
//!
//! # Usage
//!
//! ```bash
//! loglink --help
//! loglink trace 3f1c9e2a-8d4b-4f7e-9a61-2b5c0d7e4a18
//! loglink --log-dir /var/log/loglink trace trace-A --include-rotated
//! loglink summary
//! ```

#![deny(unsafe_code)]

mod records;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::config::logging::STRUCTURED_LOG_FILE;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Loglink CLI - inspect correlated request logs
#[derive(Parser)]
#[command(name = "loglink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the log files
    #[arg(short, long, env = "LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every record of one request
    Trace {
        /// Correlation id to follow
        correlation_id: String,

        /// Also read gzip-rotated files, oldest first
        #[arg(long)]
        include_rotated: bool,
    },
    /// Count records per level and distinct correlation ids
    Summary {
        /// Also read gzip-rotated files
        #[arg(long)]
        include_rotated: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Trace {
            correlation_id,
            include_rotated,
        }) => run_trace(&cli.log_dir, &correlation_id, include_rotated),
        Some(Commands::Summary { include_rotated }) => run_summary(&cli.log_dir, include_rotated),
        None => {
            println!("Loglink CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

fn run_trace(log_dir: &Path, correlation_id: &str, include_rotated: bool) -> Result<()> {
    let files = records::log_files(&log_dir.join(STRUCTURED_LOG_FILE), include_rotated)?;
    let scan = records::scan(&files)?;

    let mut found = 0;
    for record in records::trace(&scan, correlation_id) {
        println!("{}", records::format_record(record));
        found += 1;
    }

    if found == 0 {
        eprintln!("No records for correlation id {correlation_id}");
    }
    if scan.malformed > 0 {
        tracing::warn!(malformed = scan.malformed, "Skipped malformed lines");
    }
    Ok(())
}

fn run_summary(log_dir: &Path, include_rotated: bool) -> Result<()> {
    let files = records::log_files(&log_dir.join(STRUCTURED_LOG_FILE), include_rotated)?;
    let scan = records::scan(&files)?;

    println!("{}", records::Summary::from_scan(&scan));
    Ok(())
}
