//! `drop-tables` maintenance command.

use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::{Config, DROP_TABLES_TIMEOUT, DROP_TABLE_OP_TIMEOUT};
use crate::error_handling::DriverError;
use crate::schema::DbPath;
use crate::storage::{with_deadline, StorageDriver};

use super::finalize::finalize_service;
use super::init::init_service_resources;

/// Drops every table directly under the configured namespace.
///
/// Stops at the first failed drop. The whole command is bounded by
/// `DROP_TABLES_TIMEOUT`, each drop by `DROP_TABLE_OP_TIMEOUT`.
///
/// # Errors
///
/// Returns an error if initialization, the listing or any drop fails, or if
/// the overall deadline passes.
pub async fn drop_tables(config: Config) -> Result<usize> {
    let resources = init_service_resources(config).await?;
    let path = resources.config.table_path.clone();

    let result = tokio::time::timeout(
        DROP_TABLES_TIMEOUT,
        drop_all_tables(resources.driver.as_ref(), &path, DROP_TABLE_OP_TIMEOUT),
    )
    .await;

    finalize_service(resources, Vec::new()).await;

    let dropped = result
        .with_context(|| format!("drop-tables did not finish within {:?}", DROP_TABLES_TIMEOUT))?
        .with_context(|| format!("Failed to drop tables under {}", path))?;
    info!("Dropped {} tables under {}", dropped, path);
    Ok(dropped)
}

/// Lists `path` and drops each table entry in listing order.
///
/// Returns the number of tables dropped, or the first error.
pub async fn drop_all_tables(
    driver: &dyn StorageDriver,
    path: &DbPath,
    per_table: Duration,
) -> Result<usize, DriverError> {
    let listed = path.to_string();
    let entries = with_deadline(&listed, per_table, driver.list_directory(&listed)).await?;

    let mut dropped = 0;
    for entry in entries.iter().filter(|e| e.is_table()) {
        let table = path.full_table(&entry.name);
        with_deadline(&table, per_table, driver.drop_table(&table)).await?;
        warn!("Dropped table {}", table);
        dropped += 1;
    }
    Ok(dropped)
}
