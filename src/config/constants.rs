//! Configuration constants.
//!
//! Defaults for the watcher, the batch writer, the monitor and the
//! maintenance command. All of them can be overridden through `Config`.

use std::time::Duration;

/// Logical table that receives span rows.
pub const TBL_TRACES: &str = "traces";

/// SQLite database file used when no path is configured.
pub const DB_PATH: &str = "./traces.db";
/// Namespace prefix every partition table name starts with.
pub const DEFAULT_TABLE_PATH: &str = "trace_store";

/// Width of one time partition.
pub const DEFAULT_PARTITION_WIDTH: Duration = Duration::from_secs(60 * 60);

// Partition watcher
pub const DEFAULT_WATCHER_INTERVAL: Duration = Duration::from_secs(5 * 60);
/// Partitions older than this are dropped
pub const DEFAULT_WATCHER_AGE: Duration = Duration::from_secs(24 * 60 * 60);
/// Partitions are created this far ahead of now
pub const DEFAULT_WATCHER_LOOKAHEAD: Duration = Duration::from_secs(12 * 60 * 60);
/// Upper bound on buckets per logical table in one watcher window
pub const MAX_PARTITIONS_PER_TABLE: u64 = 100_000;
/// Deadline for a single create-table or drop-table call
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

// Batch writer
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);
/// Spans per batch handed to the writer by the ingest command
pub const DEFAULT_INGEST_BATCH_SIZE: usize = 1000;

// Connection monitor
pub const DEFAULT_DISCOVERY_INTERVAL: Duration = Duration::from_secs(10);
/// Capacity of the latency sample queue; samples beyond it are dropped
pub const LATENCY_QUEUE_CAPACITY: usize = 100;
/// Time the latency loop gets to log queued samples once writes are done
pub const LATENCY_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

// drop-tables maintenance command
/// Overall deadline for listing and dropping every table
pub const DROP_TABLES_TIMEOUT: Duration = Duration::from_secs(10);
/// Deadline for each individual drop inside the command
pub const DROP_TABLE_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout when opening the database connection pool
pub const DB_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
