//! Connection and latency monitor.
//!
//! Two advisory loops that never influence routing or fail a write:
//! - the endpoint loop logs the backend topology whenever it changes
//! - the latency loop logs every write latency next to the running maximum
//!
//! The monitor is built once at startup. Writers receive a cloned
//! `MonitorHandle`; nothing is looked up globally.

mod endpoints;
mod latency;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{DEFAULT_DISCOVERY_INTERVAL, DEFAULT_OPERATION_TIMEOUT, LATENCY_QUEUE_CAPACITY};
use crate::error_handling::OperationStats;
use crate::storage::StorageDriver;

pub use endpoints::{format_endpoints, run_endpoints, EndpointTracker};
pub use latency::{run_latency, LatencyTracker, MonitorHandle};

#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub discovery_interval: Duration,
    pub discovery_timeout: Duration,
    pub queue_capacity: usize,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        MonitorOptions {
            discovery_interval: DEFAULT_DISCOVERY_INTERVAL,
            discovery_timeout: DEFAULT_OPERATION_TIMEOUT,
            queue_capacity: LATENCY_QUEUE_CAPACITY,
        }
    }
}

pub struct ConnectionMonitor {
    driver: Arc<dyn StorageDriver>,
    receiver: mpsc::Receiver<Duration>,
    options: MonitorOptions,
    stats: Arc<OperationStats>,
}

/// Join handles of the two monitor loops.
pub struct MonitorTasks {
    pub endpoints: JoinHandle<()>,
    pub latency: JoinHandle<()>,
}

impl ConnectionMonitor {
    /// Creates the monitor and the handle writers report latency through.
    pub fn new(
        driver: Arc<dyn StorageDriver>,
        options: MonitorOptions,
        stats: Arc<OperationStats>,
    ) -> (Self, MonitorHandle) {
        let (sender, receiver) = mpsc::channel(options.queue_capacity.max(1));
        let handle = MonitorHandle::new(sender, Arc::clone(&stats));
        let monitor = ConnectionMonitor {
            driver,
            receiver,
            options,
            stats,
        };
        (monitor, handle)
    }

    /// Starts both loops; they run until `shutdown` is cancelled.
    pub fn spawn(self, shutdown: CancellationToken) -> MonitorTasks {
        let endpoints = tokio::spawn(run_endpoints(
            self.driver,
            self.options.discovery_interval,
            self.options.discovery_timeout,
            self.stats,
            shutdown.clone(),
        ));
        let latency = tokio::spawn(run_latency(self.receiver, shutdown));
        MonitorTasks { endpoints, latency }
    }

    #[cfg(test)]
    pub(crate) fn into_receiver(self) -> mpsc::Receiver<Duration> {
        self.receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::MockDriver;

    #[tokio::test]
    async fn test_spawned_monitor_stops_on_shutdown() {
        let driver = Arc::new(MockDriver::new());
        let stats = Arc::new(OperationStats::new());
        let options = MonitorOptions {
            discovery_interval: Duration::from_millis(5),
            ..Default::default()
        };
        let (monitor, handle) = ConnectionMonitor::new(driver, options, stats);
        let shutdown = CancellationToken::new();
        let tasks = monitor.spawn(shutdown.clone());

        handle.report_latency(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();

        let joined = tokio::time::timeout(Duration::from_secs(1), async {
            tasks.endpoints.await.expect("endpoint loop");
            tasks.latency.await.expect("latency loop");
        })
        .await;
        assert!(joined.is_ok());
        assert_eq!(handle.dropped_samples(), 0);
    }
}
