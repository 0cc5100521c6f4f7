//! Command finalization and cleanup.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::app::{print_error_statistics, print_write_statistics, shutdown_gracefully};

use super::resources::ServiceResources;

/// Time each background loop gets to observe cancellation.
const TASK_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Stops background loops, reports counters and closes the pool.
pub async fn finalize_service(
    resources: ServiceResources,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
) {
    shutdown_gracefully(resources.shutdown.clone(), tasks, TASK_STOP_TIMEOUT).await;

    print_write_statistics(&resources.metrics, &resources.config.tables);
    print_error_statistics(&resources.stats);

    if let Err(e) = sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
        .execute(resources.sqlite.pool())
        .await
    {
        log::warn!("Failed to checkpoint WAL file (this is non-critical): {}", e);
    }
    resources.sqlite.pool().close().await;
    log::debug!("Database pool closed");

    log::info!(
        "Finished in {:.1}s",
        resources.start_time.elapsed().as_secs_f64()
    );
}
