//! Command-line options.
//!
//! Every option can also be supplied through the environment variable named
//! in its `env` attribute; a `.env` file is loaded by the binary first.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::constants::*;
use crate::config::types::{Config, LogFormat, LogLevel};
use crate::schema::DbPath;

/// Command-line options and configuration.
///
/// # Examples
///
/// ```bash
/// # Keep partitions for six hours, create them two hours ahead
/// trace-store --db-path ./traces.db watcher --age 6h --lookahead 2h
///
/// # Load spans from a newline-delimited JSON file
/// trace-store ingest spans.ndjson --batch-size 500
///
/// # Remove every table under the configured path
/// trace-store --path trace_store --folder staging drop-tables
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "trace-store",
    about = "Maintains time-partitioned trace tables."
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    #[arg(long, global = true, env = "TRACE_STORE_DB_PATH", default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Table namespace inside the database
    #[arg(long, global = true, env = "TRACE_STORE_PATH", default_value = DEFAULT_TABLE_PATH)]
    pub path: String,

    /// Optional folder below the table namespace
    #[arg(long, global = true, env = "TRACE_STORE_FOLDER", default_value = "")]
    pub folder: String,

    /// Logical tables to manage (comma separated)
    #[arg(long, global = true, env = "TRACE_STORE_TABLES", value_delimiter = ',', default_value = TBL_TRACES)]
    pub tables: Vec<String>,

    /// Partition width, e.g. 30m, 1h, 1d
    #[arg(long, global = true, env = "PARTITION_WIDTH", value_parser = humantime::parse_duration, default_value = "1h")]
    pub partition_width: Duration,

    /// Retention age; must be greater than zero
    #[arg(long, global = true, env = "WATCHER_AGE", value_parser = humantime::parse_duration, default_value = "24h")]
    pub age: Duration,

    /// How far ahead partitions are created
    #[arg(long, global = true, env = "WATCHER_LOOKAHEAD", value_parser = humantime::parse_duration, default_value = "12h")]
    pub lookahead: Duration,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the partition watcher until SIGINT/SIGTERM
    Watcher {
        /// Reconciliation interval
        #[arg(long, env = "WATCHER_INTERVAL", value_parser = humantime::parse_duration, default_value = "5m")]
        interval: Duration,

        /// Endpoint discovery interval
        #[arg(long, env = "DISCOVERY_INTERVAL", value_parser = humantime::parse_duration, default_value = "10s")]
        discovery_interval: Duration,
    },
    /// Write newline-delimited JSON spans into their partitions
    Ingest {
        /// Input file, or `-` for stdin
        file: PathBuf,

        /// Spans per bulk write batch
        #[arg(long, env = "INGEST_BATCH_SIZE", default_value_t = DEFAULT_INGEST_BATCH_SIZE)]
        batch_size: usize,

        /// Deadline for each bulk write
        #[arg(long, env = "WRITE_TIMEOUT", value_parser = humantime::parse_duration, default_value = "10s")]
        write_timeout: Duration,
    },
    /// Drop every table under the configured path
    DropTables,
}

impl Cli {
    /// Builds the library configuration from the parsed options.
    pub fn to_config(&self) -> Config {
        let mut config = Config {
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            db_path: self.db_path.clone(),
            table_path: DbPath::new(&self.path, &self.folder),
            tables: self.tables.clone(),
            partition_width: self.partition_width,
            watcher_age: self.age,
            watcher_lookahead: self.lookahead,
            ..Default::default()
        };
        match &self.command {
            Command::Watcher {
                interval,
                discovery_interval,
            } => {
                config.watcher_interval = *interval;
                config.discovery_interval = *discovery_interval;
            }
            Command::Ingest { write_timeout, .. } => {
                config.write_timeout = *write_timeout;
            }
            Command::DropTables => {}
        }
        config
    }
}
