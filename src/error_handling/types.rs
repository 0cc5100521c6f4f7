//! Error type definitions.
//!
//! This module defines the error enums used across the crate and the
//! `ErrorType` categories counted by `OperationStats`.

use std::time::Duration;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error setting up the storage driver (file creation, pool connect).
    #[error("Storage initialization error: {0}")]
    StorageSetupError(String),
}

/// Invalid configuration detected before any background loop starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Retention age of zero would drop every partition on the first tick.
    #[error("cannot use watcher age '{0:?}': expiration must be greater than zero")]
    NonPositiveExpiration(Duration),

    /// Partition width must span at least one second.
    #[error("cannot use partition width '{0:?}': width must be at least one second")]
    ZeroWidth(Duration),

    /// The watcher was given nothing to manage.
    #[error("no logical tables configured")]
    EmptyTables,

    /// Age plus lookahead spans more buckets than one tick may manage.
    #[error("watcher window needs {count} partitions per table, limit is {max}")]
    TooManyPartitions { count: u64, max: u64 },

    /// The writer's logical table must be among the managed tables.
    #[error("managed tables {tables:?} do not include '{table}', which the writer targets")]
    WriteTableNotManaged { table: String, tables: Vec<String> },
}

/// Errors returned by a `StorageDriver`.
///
/// `AlreadyExists` and `NotFound` are lifecycle race outcomes: the watcher
/// treats them as success for create and drop respectively.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Target table already exists.
    #[error("table already exists: {0}")]
    AlreadyExists(String),

    /// Target table does not exist.
    #[error("table not found: {0}")]
    NotFound(String),

    /// The call did not complete before its deadline.
    #[error("operation on {table} timed out after {timeout:?}")]
    Timeout { table: String, timeout: Duration },

    /// Backend refused or could not serve the request.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Failure categories tracked across the write path and the lifecycle loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    PartitionCreateFailed,
    PartitionDropFailed,
    DirectoryListFailed,
    BulkWriteFailed,
    BulkWriteTimeout,
    EndpointDiscoveryFailed,
    LatencySampleDropped,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::PartitionCreateFailed => "Partition create failed",
            ErrorType::PartitionDropFailed => "Partition drop failed",
            ErrorType::DirectoryListFailed => "Directory listing failed",
            ErrorType::BulkWriteFailed => "Bulk write failed",
            ErrorType::BulkWriteTimeout => "Bulk write timeout",
            ErrorType::EndpointDiscoveryFailed => "Endpoint discovery failed",
            ErrorType::LatencySampleDropped => "Latency sample dropped",
        }
    }
}
