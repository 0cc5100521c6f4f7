//! Command resource initialization.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error_handling::OperationStats;
use crate::storage::SqliteDriver;
use crate::writer::WriteMetrics;

use super::resources::ServiceResources;

/// Validates `config` and opens the database.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the database cannot
/// be opened. Nothing has been spawned at that point.
pub async fn init_service_resources(config: Config) -> Result<ServiceResources> {
    config
        .validate()
        .context("Configuration validation failed")?;

    let sqlite = SqliteDriver::connect(&config.db_path)
        .await
        .context("Failed to initialize database")?;
    info!(
        "Opened {} (namespace: {}, tables: {})",
        config.db_path.display(),
        config.table_path,
        config.tables.join(",")
    );

    Ok(ServiceResources {
        driver: Arc::new(sqlite.clone()),
        sqlite,
        stats: Arc::new(OperationStats::new()),
        metrics: Arc::new(WriteMetrics::new()),
        shutdown: CancellationToken::new(),
        start_time: Instant::now(),
        config,
    })
}
