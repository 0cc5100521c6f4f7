//! Per-table write metrics.
//!
//! All counters are atomics; the table map only takes its write lock the
//! first time a logical table is seen.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error_handling::DriverError;

#[derive(Debug, Default)]
struct TableCounters {
    attempts: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    rows_written: AtomicU64,
    rows_failed: AtomicU64,
    /// Sum of bulk write durations in microseconds
    latency_sum_us: AtomicU64,
    latency_max_us: AtomicU64,
}

/// Point-in-time copy of one table's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableWriteSnapshot {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub rows_written: u64,
    pub rows_failed: u64,
    pub latency_sum: Duration,
    pub latency_max: Duration,
}

/// Bulk write metrics keyed by logical table.
#[derive(Debug, Default)]
pub struct WriteMetrics {
    tables: RwLock<BTreeMap<String, Arc<TableCounters>>>,
}

impl WriteMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self, table: &str) -> Arc<TableCounters> {
        if let Ok(tables) = self.tables.read() {
            if let Some(counters) = tables.get(table) {
                return Arc::clone(counters);
            }
        }
        match self.tables.write() {
            Ok(mut tables) => Arc::clone(tables.entry(table.to_string()).or_default()),
            // Poisoned by a panicked writer; count into a detached set.
            Err(_) => Arc::new(TableCounters::default()),
        }
    }

    /// Records one bulk write.
    pub fn emit(
        &self,
        table: &str,
        result: Result<(), &DriverError>,
        duration: Duration,
        rows: usize,
    ) {
        let counters = self.counters(table);
        let rows = rows as u64;
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        counters.attempts.fetch_add(1, Ordering::Relaxed);
        match result {
            Ok(()) => {
                counters.successes.fetch_add(1, Ordering::Relaxed);
                counters.rows_written.fetch_add(rows, Ordering::Relaxed);
            }
            Err(_) => {
                counters.failures.fetch_add(1, Ordering::Relaxed);
                counters.rows_failed.fetch_add(rows, Ordering::Relaxed);
            }
        }
        counters.latency_sum_us.fetch_add(micros, Ordering::Relaxed);
        counters.latency_max_us.fetch_max(micros, Ordering::Relaxed);
    }

    pub fn snapshot(&self, table: &str) -> Option<TableWriteSnapshot> {
        let tables = self.tables.read().ok()?;
        tables.get(table).map(|c| snapshot_of(c))
    }

    /// Total bulk writes recorded across all tables.
    pub fn total_emissions(&self) -> u64 {
        self.tables
            .read()
            .map(|tables| {
                tables
                    .values()
                    .map(|c| c.attempts.load(Ordering::Relaxed))
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Renders all counters in the Prometheus text exposition format.
    pub fn render_prometheus(&self) -> String {
        let snapshots: Vec<(String, TableWriteSnapshot)> = match self.tables.read() {
            Ok(tables) => tables
                .iter()
                .map(|(name, c)| (name.clone(), snapshot_of(c)))
                .collect(),
            Err(_) => Vec::new(),
        };

        let families: [(&str, &str, &str, fn(&TableWriteSnapshot) -> String); 6] = [
            ("trace_store_writes_total", "counter", "Bulk writes attempted", |s| {
                s.attempts.to_string()
            }),
            ("trace_store_write_failures_total", "counter", "Bulk writes that failed", |s| {
                s.failures.to_string()
            }),
            ("trace_store_rows_written_total", "counter", "Rows written successfully", |s| {
                s.rows_written.to_string()
            }),
            ("trace_store_rows_failed_total", "counter", "Rows in failed writes", |s| {
                s.rows_failed.to_string()
            }),
            (
                "trace_store_write_latency_seconds_sum",
                "counter",
                "Total time spent in bulk writes",
                |s| format!("{:.6}", s.latency_sum.as_secs_f64()),
            ),
            (
                "trace_store_write_latency_seconds_max",
                "gauge",
                "Slowest bulk write observed",
                |s| format!("{:.6}", s.latency_max.as_secs_f64()),
            ),
        ];

        let mut out = String::new();
        for (name, kind, help, value) in families {
            let _ = writeln!(out, "# HELP {} {}", name, help);
            let _ = writeln!(out, "# TYPE {} {}", name, kind);
            for (table, snapshot) in &snapshots {
                let _ = writeln!(out, "{}{{table=\"{}\"}} {}", name, table, value(snapshot));
            }
        }
        out
    }
}

fn snapshot_of(c: &TableCounters) -> TableWriteSnapshot {
    TableWriteSnapshot {
        attempts: c.attempts.load(Ordering::Relaxed),
        successes: c.successes.load(Ordering::Relaxed),
        failures: c.failures.load(Ordering::Relaxed),
        rows_written: c.rows_written.load(Ordering::Relaxed),
        rows_failed: c.rows_failed.load(Ordering::Relaxed),
        latency_sum: Duration::from_micros(c.latency_sum_us.load(Ordering::Relaxed)),
        latency_max: Duration::from_micros(c.latency_max_us.load(Ordering::Relaxed)),
    }
}
