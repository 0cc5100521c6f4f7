//! Latency sample queue and the running-maximum observer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use crate::error_handling::{ErrorType, OperationStats};

/// Producer side of the latency queue, cloned into every writer.
///
/// `report_latency` never blocks: when the queue is full the sample is
/// dropped and counted.
#[derive(Clone)]
pub struct MonitorHandle {
    sender: mpsc::Sender<Duration>,
    dropped: Arc<AtomicU64>,
    stats: Arc<OperationStats>,
}

impl MonitorHandle {
    pub(crate) fn new(sender: mpsc::Sender<Duration>, stats: Arc<OperationStats>) -> Self {
        MonitorHandle {
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
            stats,
        }
    }

    /// Pushes one write latency sample without waiting.
    pub fn report_latency(&self, latency: Duration) {
        match self.sender.try_send(latency) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                self.stats.increment_error(ErrorType::LatencySampleDropped);
            }
            // Monitor already stopped; nobody is listening.
            Err(TrySendError::Closed(_)) => {}
        }
    }

    /// Samples dropped because the queue was full.
    pub fn dropped_samples(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Running maximum of observed latencies since process start.
#[derive(Debug, Default)]
pub struct LatencyTracker {
    max: Duration,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds `latency` into the maximum and returns the new maximum.
    pub fn observe(&mut self, latency: Duration) -> Duration {
        if latency > self.max {
            self.max = latency;
        }
        self.max
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

/// Consumes latency samples until shutdown or until every handle is dropped.
pub async fn run_latency(mut receiver: mpsc::Receiver<Duration>, shutdown: CancellationToken) {
    let mut tracker = LatencyTracker::new();
    loop {
        tokio::select! {
            sample = receiver.recv() => {
                let Some(latency) = sample else {
                    log::debug!("Latency monitor: all handles dropped, stopping");
                    break;
                };
                let max_latency = tracker.observe(latency);
                log::info!(
                    "LATENCY MONITOR: latency={:?} max_latency={:?}",
                    latency,
                    max_latency
                );
            }
            _ = shutdown.cancelled() => {
                log::debug!("Latency monitor shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_max_sequence() {
        let mut tracker = LatencyTracker::new();
        let maxima: Vec<Duration> = [10, 50, 20]
            .into_iter()
            .map(|ms| tracker.observe(Duration::from_millis(ms)))
            .collect();
        assert_eq!(
            maxima,
            vec![
                Duration::from_millis(10),
                Duration::from_millis(50),
                Duration::from_millis(50)
            ]
        );
        assert_eq!(tracker.max(), Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_full_queue_drops_and_counts() {
        let stats = Arc::new(OperationStats::new());
        let (tx, _rx) = mpsc::channel(2);
        let handle = MonitorHandle::new(tx, Arc::clone(&stats));

        for ms in 0..5 {
            handle.report_latency(Duration::from_millis(ms));
        }

        assert_eq!(handle.dropped_samples(), 3);
        assert_eq!(stats.get_error_count(ErrorType::LatencySampleDropped), 3);
    }

    #[tokio::test]
    async fn test_closed_queue_is_ignored() {
        let stats = Arc::new(OperationStats::new());
        let (tx, rx) = mpsc::channel(2);
        drop(rx);
        let handle = MonitorHandle::new(tx, Arc::clone(&stats));
        handle.report_latency(Duration::from_millis(1));
        assert_eq!(handle.dropped_samples(), 0);
    }

    #[tokio::test]
    async fn test_run_latency_stops_when_handles_drop() {
        let stats = Arc::new(OperationStats::new());
        let (tx, rx) = mpsc::channel(10);
        let handle = MonitorHandle::new(tx, stats);
        handle.report_latency(Duration::from_millis(10));
        handle.report_latency(Duration::from_millis(50));
        drop(handle);

        tokio::time::timeout(
            Duration::from_secs(1),
            run_latency(rx, CancellationToken::new()),
        )
        .await
        .expect("loop should end once the queue is closed and drained");
    }

    #[tokio::test]
    async fn test_run_latency_stops_on_shutdown() {
        let (_tx, rx) = mpsc::channel::<Duration>(10);
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), run_latency(rx, shutdown))
            .await
            .expect("loop should observe cancellation");
    }
}
