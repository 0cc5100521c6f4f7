//! `ingest` command: loads newline-delimited JSON spans.
//!
//! Runs a single watcher tick so the current window's partitions exist, then
//! streams the input through the batch writer.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::app::wait_for_drain;
use crate::config::{Config, LATENCY_DRAIN_TIMEOUT};
use crate::storage::Span;
use crate::writer::BatchWriter;

use super::finalize::finalize_service;
use super::init::init_service_resources;

/// Counts of one ingest run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Non-blank input lines read
    pub lines: usize,
    /// Spans handed to the writer
    pub spans: usize,
    /// Lines that did not parse as a span
    pub skipped: usize,
    pub batches: usize,
}

/// Ingests `file` (or stdin when `file` is `-`).
///
/// # Errors
///
/// Returns an error if initialization fails or the input cannot be opened or
/// read. Individual write failures are logged and counted, not returned.
pub async fn ingest_file(config: Config, file: &Path, batch_size: usize) -> Result<IngestReport> {
    let resources = init_service_resources(config).await?;
    let watcher = resources.watcher()?;
    watcher.tick().await.log();

    let (monitor, handle) = resources.monitor();
    let monitor_tasks = monitor.spawn(resources.shutdown.clone());
    let writer = resources.writer(handle);

    let result = if file.as_os_str() == "-" {
        info!("Reading spans from stdin");
        ingest_reader(BufReader::new(tokio::io::stdin()), &writer, batch_size).await
    } else {
        match tokio::fs::File::open(file).await {
            Ok(f) => ingest_reader(BufReader::new(f), &writer, batch_size).await,
            Err(e) => {
                Err(anyhow::Error::new(e).context(format!("Failed to open {}", file.display())))
            }
        }
    };
    // The latency loop ends once the last handle is gone and its queue is empty
    drop(writer);
    let mut tasks = vec![("endpoint monitor", monitor_tasks.endpoints)];
    if let Some(latency) =
        wait_for_drain("latency monitor", monitor_tasks.latency, LATENCY_DRAIN_TIMEOUT).await
    {
        tasks.push(("latency monitor", latency));
    }

    finalize_service(resources, tasks).await;

    let report = result?;
    info!(
        "Ingested {} spans in {} batches ({} lines skipped)",
        report.spans, report.batches, report.skipped
    );
    Ok(report)
}

/// Reads spans from `reader` and writes them in batches of `batch_size`.
///
/// Blank lines are ignored and malformed lines are skipped with a warning.
pub async fn ingest_reader<R>(
    reader: R,
    writer: &BatchWriter,
    batch_size: usize,
) -> Result<IngestReport>
where
    R: AsyncBufRead + Unpin,
{
    let batch_size = batch_size.max(1);
    let mut report = IngestReport::default();
    let mut batch: Vec<Span> = Vec::with_capacity(batch_size);
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        report.lines += 1;

        match serde_json::from_str::<Span>(trimmed) {
            Ok(span) => batch.push(span),
            Err(e) => {
                report.skipped += 1;
                warn!("Skipping malformed span on line {}: {}", report.lines, e);
                continue;
            }
        }

        if batch.len() >= batch_size {
            flush(writer, &mut batch, &mut report).await;
        }
    }
    flush(writer, &mut batch, &mut report).await;

    Ok(report)
}

async fn flush(writer: &BatchWriter, batch: &mut Vec<Span>, report: &mut IngestReport) {
    if batch.is_empty() {
        return;
    }
    writer.write_items(batch).await;
    report.spans += batch.len();
    report.batches += 1;
    batch.clear();
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{DateTime, Utc};

    use super::*;
    use crate::error_handling::OperationStats;
    use crate::monitor::{ConnectionMonitor, MonitorOptions};
    use crate::schema::DbPath;
    use crate::storage::test_helpers::MockDriver;
    use crate::writer::{BatchWriterOptions, WriteMetrics};

    fn span_json(id: u64, start: &str) -> String {
        let span = Span {
            trace_id_high: 0,
            trace_id_low: id,
            span_id: id,
            service_name: "checkout".into(),
            operation_name: "charge".into(),
            flags: 1,
            start_time: DateTime::parse_from_rfc3339(start)
                .expect("valid timestamp")
                .with_timezone(&Utc),
            duration: Duration::from_millis(12),
            tags: BTreeMap::new(),
        };
        serde_json::to_string(&span).expect("span serializes")
    }

    fn writer(driver: Arc<MockDriver>) -> BatchWriter {
        let stats = Arc::new(OperationStats::new());
        let (_monitor, handle) =
            ConnectionMonitor::new(driver.clone(), MonitorOptions::default(), Arc::clone(&stats));
        BatchWriter::new(
            driver,
            handle,
            Arc::new(WriteMetrics::new()),
            stats,
            BatchWriterOptions {
                db_path: DbPath::new("db", ""),
                width: Duration::from_secs(3600),
                write_timeout: Duration::from_secs(1),
            },
        )
    }

    #[tokio::test]
    async fn test_batches_and_skips_malformed_lines() {
        let driver = Arc::new(MockDriver::new());
        let writer = writer(driver.clone());
        let input = [
            span_json(1, "2024-03-10T14:10:00Z"),
            String::new(),
            "{not json".to_string(),
            span_json(2, "2024-03-10T14:20:00Z"),
            span_json(3, "2024-03-10T14:30:00Z"),
        ]
        .join("\n");

        let report = ingest_reader(input.as_bytes(), &writer, 2)
            .await
            .expect("in-memory input is readable");

        assert_eq!(
            report,
            IngestReport {
                lines: 4,
                spans: 3,
                skipped: 1,
                batches: 2,
            }
        );
        let upserts = driver.upserts();
        assert_eq!(upserts.len(), 2);
        assert_eq!(upserts[0].1.len(), 2);
        assert_eq!(upserts[1].1.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_input_writes_nothing() {
        let driver = Arc::new(MockDriver::new());
        let writer = writer(driver.clone());
        let report = ingest_reader(&b"\n\n"[..], &writer, 10)
            .await
            .expect("in-memory input is readable");
        assert_eq!(report, IngestReport::default());
        assert!(driver.calls().is_empty());
    }
}
