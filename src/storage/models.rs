//! Span record and its bulk-row form.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The record kind accepted by the batch writer.
///
/// Only `start_time` matters to partitioning; everything else is carried
/// through to the row unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub trace_id_high: u64,
    pub trace_id_low: u64,
    pub span_id: u64,
    pub service_name: String,
    pub operation_name: String,
    pub flags: u32,
    pub start_time: DateTime<Utc>,
    pub duration: Duration,
    pub tags: BTreeMap<String, String>,
}

/// One row of a span table.
///
/// Integers are stored as `i64` because that is what SQLite binds; the ids
/// are bit-cast, not range-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanRow {
    pub trace_id_high: i64,
    pub trace_id_low: i64,
    pub span_id: i64,
    pub service_name: String,
    pub operation_name: String,
    pub flags: i64,
    pub start_time_us: i64,
    pub duration_us: i64,
    /// Tags as a JSON object
    pub extra: String,
}

impl From<&Span> for SpanRow {
    fn from(span: &Span) -> Self {
        SpanRow {
            trace_id_high: span.trace_id_high as i64,
            trace_id_low: span.trace_id_low as i64,
            span_id: span.span_id as i64,
            service_name: span.service_name.clone(),
            operation_name: span.operation_name.clone(),
            flags: i64::from(span.flags),
            start_time_us: span.start_time.timestamp_micros(),
            duration_us: i64::try_from(span.duration.as_micros()).unwrap_or(i64::MAX),
            extra: serde_json::to_string(&span.tags).unwrap_or_else(|_| "{}".to_string()),
        }
    }
}
