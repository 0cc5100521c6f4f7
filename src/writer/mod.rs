//! Batch writer.
//!
//! Splits a batch of spans by partition key and issues one bulk upsert per
//! partition. Groups are written concurrently and independently: a failing
//! group is logged and counted, and never affects its siblings or the
//! caller. `write_items` returns nothing by contract.

mod flush;
mod metrics;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::config::{DEFAULT_PARTITION_WIDTH, DEFAULT_TABLE_PATH, DEFAULT_WRITE_TIMEOUT};
use crate::error_handling::OperationStats;
use crate::monitor::MonitorHandle;
use crate::schema::{partition_from_time, DbPath, PartitionKey};
use crate::storage::{Span, StorageDriver};

pub use metrics::{TableWriteSnapshot, WriteMetrics};

#[derive(Debug, Clone)]
pub struct BatchWriterOptions {
    /// Namespace the partition tables live under
    pub db_path: DbPath,
    /// Partition width; must match the watcher's
    pub width: Duration,
    /// Deadline for each bulk write
    pub write_timeout: Duration,
}

impl Default for BatchWriterOptions {
    fn default() -> Self {
        BatchWriterOptions {
            db_path: DbPath::new(DEFAULT_TABLE_PATH, ""),
            width: DEFAULT_PARTITION_WIDTH,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

/// Writes span batches to their time partitions.
///
/// Holds no mutable state besides atomic counters, so one writer can be
/// shared (`Arc`) by any number of concurrent callers.
pub struct BatchWriter {
    driver: Arc<dyn StorageDriver>,
    monitor: MonitorHandle,
    metrics: Arc<WriteMetrics>,
    stats: Arc<OperationStats>,
    opts: BatchWriterOptions,
}

/// Groups spans by the partition their start time falls in.
///
/// Input order is preserved within each group.
pub fn group_by_partition(spans: &[Span], width: Duration) -> BTreeMap<PartitionKey, Vec<&Span>> {
    let mut parts: BTreeMap<PartitionKey, Vec<&Span>> = BTreeMap::new();
    for span in spans {
        parts
            .entry(partition_from_time(span.start_time, width))
            .or_default()
            .push(span);
    }
    parts
}

impl BatchWriter {
    pub fn new(
        driver: Arc<dyn StorageDriver>,
        monitor: MonitorHandle,
        metrics: Arc<WriteMetrics>,
        stats: Arc<OperationStats>,
        opts: BatchWriterOptions,
    ) -> Self {
        BatchWriter {
            driver,
            monitor,
            metrics,
            stats,
            opts,
        }
    }

    pub fn metrics(&self) -> &Arc<WriteMetrics> {
        &self.metrics
    }

    /// Writes `spans`, one bulk upsert per partition.
    ///
    /// An empty batch makes no backend calls and emits no metrics.
    pub async fn write_items(&self, spans: &[Span]) {
        if spans.is_empty() {
            return;
        }
        let parts = group_by_partition(spans, self.opts.width);
        log::debug!(
            "Writing batch of {} spans to {} partitions",
            spans.len(),
            parts.len()
        );
        join_all(
            parts
                .into_iter()
                .map(|(key, partial)| self.write_items_to_partition(key, partial)),
        )
        .await;
    }
}
