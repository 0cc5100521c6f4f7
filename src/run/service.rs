//! Long-running `watcher` command.

use anyhow::{Context, Result};
use log::info;

use crate::app::wait_for_signal;
use crate::config::Config;

use super::finalize::finalize_service;
use super::init::init_service_resources;

/// Runs the partition watcher and the monitor loops until SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns an error if initialization fails or the signal handler cannot be
/// installed. Per-call backend failures never end the run.
pub async fn run_watcher(config: Config) -> Result<()> {
    let resources = init_service_resources(config).await?;
    let watcher = resources.watcher()?;

    let (monitor, _latency_handle) = resources.monitor();
    let monitor_tasks = monitor.spawn(resources.shutdown.clone());

    let interval = resources.config.watcher_interval;
    info!(
        "Starting partition watcher: interval={:?} age={:?} lookahead={:?} width={:?}",
        interval,
        resources.config.watcher_age,
        resources.config.watcher_lookahead,
        resources.config.partition_width
    );
    let (watcher_task, ready) = watcher.spawn(interval, resources.shutdown.clone());
    let readiness_task = tokio::spawn(async move {
        if ready.wait().await {
            info!("Initial partitions are in place; writes may start");
        }
    });

    let signal = wait_for_signal().await;

    finalize_service(
        resources,
        vec![
            ("partition watcher", watcher_task),
            ("endpoint monitor", monitor_tasks.endpoints),
            ("latency monitor", monitor_tasks.latency),
            ("readiness", readiness_task),
        ],
    )
    .await;

    signal.context("Failed to listen for shutdown signals")
}
