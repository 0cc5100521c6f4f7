//! Per-partition bulk upload.

use std::time::Instant;

use crate::config::TBL_TRACES;
use crate::error_handling::{categorize_write_error, DriverError};
use crate::schema::PartitionKey;
use crate::storage::{with_deadline, Span, SpanRow};

use super::BatchWriter;

impl BatchWriter {
    /// Uploads one partition's spans. Failures end here: logged and counted.
    pub(super) async fn write_items_to_partition(&self, part: PartitionKey, spans: Vec<&Span>) {
        let rows: Vec<SpanRow> = spans.into_iter().map(SpanRow::from).collect();
        let table_name = part.build_full_table_name(&self.opts.db_path.to_string(), TBL_TRACES);

        if let Err(e) = self.upload_rows(&table_name, TBL_TRACES, rows).await {
            self.stats.increment_error(categorize_write_error(&e));
            log::error!(
                "insertSpan error: table={} partition={} error={}",
                table_name,
                part,
                e
            );
        }
    }

    /// One bulk upsert under the write deadline.
    ///
    /// Always reports the elapsed time to the monitor and emits metrics for
    /// `logical_table`, whatever the outcome.
    async fn upload_rows(
        &self,
        table_name: &str,
        logical_table: &str,
        rows: Vec<SpanRow>,
    ) -> Result<(), DriverError> {
        let row_count = rows.len();
        let start = Instant::now();
        let result = with_deadline(
            table_name,
            self.opts.write_timeout,
            self.driver.bulk_upsert(table_name, rows),
        )
        .await;
        let elapsed = start.elapsed();

        self.monitor.report_latency(elapsed);
        self.metrics
            .emit(logical_table, result.as_ref().map(|_| ()), elapsed, row_count);
        result
    }
}
