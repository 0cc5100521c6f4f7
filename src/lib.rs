//! partitioned_trace_store: time-partitioned span storage
//!
//! Spans are written to one physical table per fixed-width time bucket. A
//! background watcher keeps the current window of buckets created and drops
//! buckets older than the retention age, so expiring old data is a table
//! drop instead of a row delete.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use partitioned_trace_store::monitor::ConnectionMonitor;
//! use partitioned_trace_store::storage::SqliteDriver;
//! use partitioned_trace_store::watcher::Watcher;
//! use partitioned_trace_store::writer::{BatchWriter, WriteMetrics};
//! use partitioned_trace_store::{Config, OperationStats};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let driver = Arc::new(SqliteDriver::connect(&config.db_path).await?);
//! let stats = Arc::new(OperationStats::new());
//! let shutdown = CancellationToken::new();
//!
//! let (monitor, handle) =
//!     ConnectionMonitor::new(driver.clone(), config.monitor_options(), stats.clone());
//! monitor.spawn(shutdown.clone());
//!
//! let watcher = Watcher::new(config.watcher_options(), driver.clone(), stats.clone())?;
//! let (_task, ready) = watcher.spawn(config.watcher_interval, shutdown.clone());
//! ready.wait().await;
//!
//! let writer = BatchWriter::new(
//!     driver,
//!     handle,
//!     Arc::new(WriteMetrics::new()),
//!     stats,
//!     config.writer_options(),
//! );
//! writer.write_items(&[]).await;
//! shutdown.cancel();
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod app;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod monitor;
pub mod run;
pub mod schema;
pub mod storage;
pub mod watcher;
pub mod writer;

// Re-export public API
pub use config::{Cli, Command, Config, LogFormat, LogLevel};
pub use error_handling::{ConfigError, DriverError, ErrorType, OperationStats};
pub use run::{drop_tables, ingest_file, run_watcher, IngestReport};
pub use schema::{partition_from_time, DbPath, PartitionKey};
