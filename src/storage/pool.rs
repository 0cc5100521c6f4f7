//! Database connection pool management.
//!
//! This module initializes and configures the SQLite connection pool with:
//! - WAL mode enabled for concurrent access
//! - A bounded acquire timeout so callers fail instead of queueing forever
//! - Automatic database file creation

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use log::{error, info};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::config::DB_CONNECT_TIMEOUT;
use crate::error_handling::InitializationError;

/// Initializes and returns a database connection pool for `db_path`.
///
/// Creates the database file if it doesn't exist and enables WAL mode.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<SqlitePool, InitializationError> {
    let db_path_str = db_path.to_string_lossy().to_string();
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&db_path_str)
    {
        Ok(_) => info!("Database file created: {}", db_path_str),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Database file already exists: {}", db_path_str)
        }
        Err(e) => {
            error!("Failed to create database file: {e}");
            return Err(InitializationError::StorageSetupError(e.to_string()));
        }
    }

    let pool = SqlitePoolOptions::new()
        .acquire_timeout(DB_CONNECT_TIMEOUT)
        .connect(&format!("sqlite:{}", db_path_str))
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            InitializationError::StorageSetupError(e.to_string())
        })?;

    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .map_err(|e| {
            error!("Failed to set WAL mode: {e}");
            InitializationError::StorageSetupError(e.to_string())
        })?;

    Ok(pool)
}
