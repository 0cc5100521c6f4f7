//! End-of-run statistics.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, OperationStats};
use crate::writer::WriteMetrics;

/// Non-zero failure counts, one line per category.
pub fn error_summary_lines(stats: &OperationStats) -> Vec<String> {
    ErrorType::iter()
        .filter_map(|error_type| {
            let count = stats.get_error_count(error_type);
            (count > 0).then(|| format!("{}: {}", error_type.as_str(), count))
        })
        .collect()
}

/// Logs the failure counters collected during the run.
pub fn print_error_statistics(stats: &OperationStats) {
    let total = stats.total_errors();
    if total == 0 {
        info!("No failures recorded");
        return;
    }
    info!("Error Counts ({} total):", total);
    for line in error_summary_lines(stats) {
        info!("   {}", line);
    }
}

/// Logs the write counters of each logical table.
pub fn print_write_statistics(metrics: &WriteMetrics, tables: &[String]) {
    for table in tables {
        if let Some(s) = metrics.snapshot(table) {
            info!(
                "Writes: table={} batches={} failed={} rows_written={} rows_failed={} max_latency={:?}",
                table, s.attempts, s.failures, s.rows_written, s.rows_failed, s.latency_max
            );
        }
    }
    log::debug!("Write metrics:\n{}", metrics.render_prometheus());
}
