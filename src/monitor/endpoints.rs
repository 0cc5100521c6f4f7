//! Backend topology observer.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error_handling::{ErrorType, OperationStats};
use crate::storage::{with_deadline, Endpoint, StorageDriver};

/// Renders endpoints sorted by node id as `(1), (2), ...`.
pub fn format_endpoints(mut endpoints: Vec<Endpoint>) -> String {
    endpoints.sort_by_key(|ep| ep.node_id);
    endpoints
        .iter()
        .map(|ep| format!("({}), ", ep.node_id))
        .collect()
}

/// Remembers the last topology seen and reports only changes.
#[derive(Debug, Default)]
pub struct EndpointTracker {
    previous: String,
}

impl EndpointTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new rendering when it differs from the previous one.
    pub fn update(&mut self, endpoints: Vec<Endpoint>) -> Option<&str> {
        let rendered = format_endpoints(endpoints);
        if rendered == self.previous {
            return None;
        }
        self.previous = rendered;
        Some(&self.previous)
    }
}

/// Polls endpoint discovery every `every` until shutdown.
///
/// A failed discovery is logged and counted; the previous topology is kept
/// so a transient error is not reported as a topology change.
pub async fn run_endpoints(
    driver: Arc<dyn StorageDriver>,
    every: Duration,
    deadline: Duration,
    stats: Arc<OperationStats>,
    shutdown: CancellationToken,
) {
    let mut tracker = EndpointTracker::new();
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match with_deadline("endpoint discovery", deadline, driver.discover_endpoints()).await {
                    Ok(endpoints) => {
                        if let Some(rendered) = tracker.update(endpoints) {
                            log::warn!("ENDPOINTS MONITOR: endpoints={}", rendered);
                        }
                    }
                    Err(e) => {
                        stats.increment_error(ErrorType::EndpointDiscoveryFailed);
                        log::error!("Endpoint discovery failed: error={}", e);
                    }
                }
            }
            _ = shutdown.cancelled() => {
                log::debug!("Endpoint monitor shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::{Call, MockDriver};

    fn ep(node_id: u32) -> Endpoint {
        Endpoint {
            node_id,
            address: format!("node-{node_id}:2135"),
        }
    }

    #[test]
    fn test_format_sorts_by_node_id() {
        assert_eq!(format_endpoints(vec![ep(3), ep(1), ep(2)]), "(1), (2), (3), ");
        assert_eq!(format_endpoints(Vec::new()), "");
    }

    #[test]
    fn test_tracker_reports_only_changes() {
        let mut tracker = EndpointTracker::new();
        assert_eq!(tracker.update(vec![ep(2), ep(1)]), Some("(1), (2), "));
        // same set, different order
        assert_eq!(tracker.update(vec![ep(1), ep(2)]), None);
        assert_eq!(tracker.update(vec![ep(1)]), Some("(1), "));
        assert_eq!(tracker.update(vec![ep(1)]), None);
    }

    #[tokio::test]
    async fn test_discovery_errors_do_not_stop_the_loop() {
        let driver = Arc::new(MockDriver::new());
        driver.push_discovery(Err("connection refused".into()));
        driver.push_discovery(Err("connection refused".into()));
        driver.push_discovery(Ok(vec![ep(1)]));
        let stats = Arc::new(OperationStats::new());
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(run_endpoints(
            driver.clone(),
            Duration::from_millis(5),
            Duration::from_secs(1),
            Arc::clone(&stats),
            shutdown.clone(),
        ));

        tokio::time::timeout(Duration::from_secs(2), async {
            while driver.calls().iter().filter(|c| **c == Call::Discover).count() < 4 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("loop keeps polling after errors");

        shutdown.cancel();
        task.await.expect("endpoint loop should not panic");
        assert_eq!(stats.get_error_count(ErrorType::EndpointDiscoveryFailed), 2);
    }
}
