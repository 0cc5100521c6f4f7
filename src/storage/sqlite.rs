//! SQLite-backed storage driver.
//!
//! Each partition table is an ordinary SQLite table whose name is the full
//! table path (slashes included). Directory listings are derived from
//! `sqlite_master` by splitting names on `/`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error_handling::{DriverError, InitializationError};
use crate::storage::driver::{DirectoryEntry, Endpoint, EntryKind, StorageDriver};
use crate::storage::models::SpanRow;
use crate::storage::pool::init_db_pool_with_path;

const SPAN_COLUMNS: &str = "trace_id_high, trace_id_low, span_id, service_name, \
     operation_name, flags, start_time_us, duration_us, extra";

/// `StorageDriver` over an `sqlx` SQLite pool.
///
/// The pool is the session pool: every call acquires a connection for its
/// own duration and returns it when the call's future completes or is dropped.
#[derive(Clone)]
pub struct SqliteDriver {
    pool: SqlitePool,
    db_file: PathBuf,
}

impl SqliteDriver {
    pub fn new(pool: SqlitePool, db_file: impl Into<PathBuf>) -> Self {
        SqliteDriver {
            pool,
            db_file: db_file.into(),
        }
    }

    /// Opens (creating if needed) the database file and wraps its pool.
    pub async fn connect(db_file: &Path) -> Result<Self, InitializationError> {
        let pool = init_db_pool_with_path(db_file).await?;
        Ok(SqliteDriver::new(pool, db_file))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Quotes an identifier for SQLite.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Maps SQLite failures onto the lifecycle outcomes callers distinguish.
fn classify(table: &str, err: sqlx::Error) -> DriverError {
    if let sqlx::Error::Database(db) = &err {
        let message = db.message();
        if message.contains("no such table") {
            return DriverError::NotFound(table.to_string());
        }
        if message.contains("already exists") {
            return DriverError::AlreadyExists(table.to_string());
        }
    }
    if matches!(
        err,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
    ) {
        return DriverError::Unavailable(err.to_string());
    }
    DriverError::SqlError(err)
}

/// Splits `sqlite_master` rows into the direct children of `path`.
fn children_of(path: &str, objects: Vec<(String, String)>) -> Vec<DirectoryEntry> {
    let prefix = path.trim_end_matches('/');
    let mut entries = Vec::new();
    let mut directories = BTreeSet::new();

    for (name, object_type) in objects {
        let relative = if prefix.is_empty() {
            name.as_str()
        } else {
            match name
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('/'))
            {
                Some(rest) => rest,
                None => continue,
            }
        };
        match relative.split_once('/') {
            Some((dir, _)) => {
                directories.insert(dir.to_string());
            }
            None => {
                let kind = if object_type == "table" {
                    EntryKind::Table
                } else {
                    EntryKind::Other
                };
                entries.push(DirectoryEntry {
                    name: relative.to_string(),
                    kind,
                });
            }
        }
    }

    entries.extend(directories.into_iter().map(|name| DirectoryEntry {
        name,
        kind: EntryKind::Directory,
    }));
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

#[async_trait]
impl StorageDriver for SqliteDriver {
    async fn create_table(&self, table: &str) -> Result<(), DriverError> {
        let sql = format!(
            "CREATE TABLE {} (
                trace_id_high INTEGER NOT NULL,
                trace_id_low INTEGER NOT NULL,
                span_id INTEGER NOT NULL,
                service_name TEXT NOT NULL,
                operation_name TEXT NOT NULL,
                flags INTEGER NOT NULL,
                start_time_us INTEGER NOT NULL,
                duration_us INTEGER NOT NULL,
                extra TEXT NOT NULL,
                PRIMARY KEY (trace_id_high, trace_id_low, span_id)
            )",
            quote_ident(table)
        );
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(table, e))?;
        Ok(())
    }

    async fn drop_table(&self, table: &str) -> Result<(), DriverError> {
        let sql = format!("DROP TABLE {}", quote_ident(table));
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(table, e))?;
        Ok(())
    }

    async fn bulk_upsert(&self, table: &str, rows: Vec<SpanRow>) -> Result<(), DriverError> {
        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            quote_ident(table),
            SPAN_COLUMNS
        );

        // Rolled back on drop, so a failed or timed-out write leaves no partial rows.
        let mut tx = self.pool.begin().await.map_err(|e| classify(table, e))?;
        for row in rows {
            sqlx::query(&sql)
                .bind(row.trace_id_high)
                .bind(row.trace_id_low)
                .bind(row.span_id)
                .bind(row.service_name)
                .bind(row.operation_name)
                .bind(row.flags)
                .bind(row.start_time_us)
                .bind(row.duration_us)
                .bind(row.extra)
                .execute(&mut *tx)
                .await
                .map_err(|e| classify(table, e))?;
        }
        tx.commit().await.map_err(|e| classify(table, e))?;
        Ok(())
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>, DriverError> {
        let objects: Vec<(String, String)> = sqlx::query_as(
            "SELECT name, type FROM sqlite_master
             WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify(path, e))?;
        Ok(children_of(path, objects))
    }

    async fn discover_endpoints(&self) -> Result<Vec<Endpoint>, DriverError> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DriverError::Unavailable(e.to_string()))?;
        Ok(vec![Endpoint {
            node_id: 1,
            address: self.db_file.to_string_lossy().to_string(),
        }])
    }
}
