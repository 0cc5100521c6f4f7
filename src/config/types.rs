//! Configuration types.
//!
//! `Config` is the library-level configuration; it has no CLI dependency and
//! can be built programmatically. The CLI in `config::cli` converts into it.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::*;
use crate::error_handling::ConfigError;
use crate::monitor::MonitorOptions;
use crate::schema::DbPath;
use crate::watcher::WatcherOptions;
use crate::writer::BatchWriterOptions;

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: One JSON object per line for log shippers
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration.
///
/// # Examples
///
/// ```
/// use partitioned_trace_store::Config;
/// use std::time::Duration;
///
/// let config = Config {
///     watcher_age: Duration::from_secs(6 * 3600),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Namespace under which partition tables live
    pub table_path: DbPath,

    /// Logical tables managed by the watcher; all share one partition width
    pub tables: Vec<String>,

    /// Width of one time partition
    pub partition_width: Duration,

    /// How often the watcher reconciles partitions
    pub watcher_interval: Duration,

    /// Retention age; partitions entirely older than `now - age` are dropped
    pub watcher_age: Duration,

    /// How far into the future partitions are pre-created
    pub watcher_lookahead: Duration,

    /// Deadline for one create-table or drop-table call
    pub operation_timeout: Duration,

    /// Deadline for one bulk write
    pub write_timeout: Duration,

    /// Pause between endpoint discovery calls
    pub discovery_interval: Duration,

    /// Latency queue capacity
    pub latency_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: PathBuf::from(DB_PATH),
            table_path: DbPath::new(DEFAULT_TABLE_PATH, ""),
            tables: vec![TBL_TRACES.to_string()],
            partition_width: DEFAULT_PARTITION_WIDTH,
            watcher_interval: DEFAULT_WATCHER_INTERVAL,
            watcher_age: DEFAULT_WATCHER_AGE,
            watcher_lookahead: DEFAULT_WATCHER_LOOKAHEAD,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            discovery_interval: DEFAULT_DISCOVERY_INTERVAL,
            latency_queue_capacity: LATENCY_QUEUE_CAPACITY,
        }
    }
}

impl Config {
    /// Rejects configurations that must never reach a running watcher.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.watcher_options().validate()?;
        if !self.tables.iter().any(|t| t == TBL_TRACES) {
            return Err(ConfigError::WriteTableNotManaged {
                table: TBL_TRACES.to_string(),
                tables: self.tables.clone(),
            });
        }
        Ok(())
    }

    pub fn watcher_options(&self) -> WatcherOptions {
        WatcherOptions {
            expiration: self.watcher_age,
            lookahead: self.watcher_lookahead,
            width: self.partition_width,
            db_path: self.table_path.clone(),
            tables: self.tables.clone(),
            operation_timeout: self.operation_timeout,
        }
    }

    pub fn writer_options(&self) -> BatchWriterOptions {
        BatchWriterOptions {
            db_path: self.table_path.clone(),
            width: self.partition_width,
            write_timeout: self.write_timeout,
        }
    }

    pub fn monitor_options(&self) -> MonitorOptions {
        MonitorOptions {
            discovery_interval: self.discovery_interval,
            discovery_timeout: self.operation_timeout,
            queue_capacity: self.latency_queue_capacity,
        }
    }
}
