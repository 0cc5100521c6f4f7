//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `partitioned_trace_store` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use partitioned_trace_store::initialization::init_logger_with;
use partitioned_trace_store::{drop_tables, ingest_file, run_watcher, Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // .env in the working directory first, then next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    let config = cli.to_config();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let result = match &cli.command {
        Command::Watcher { .. } => run_watcher(config).await,
        Command::Ingest {
            file, batch_size, ..
        } => ingest_file(config, file, *batch_size).await.map(|_| ()),
        Command::DropTables => drop_tables(config).await.map(|_| ()),
    };

    if let Err(e) = result {
        eprintln!("trace-store error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
