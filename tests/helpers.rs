// Shared test helpers for database setup and span creation.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tempfile::TempDir;

use partitioned_trace_store::storage::{Span, SqliteDriver};

/// Opens a fresh SQLite database inside a temporary directory.
///
/// The directory must outlive the driver, so it is returned alongside.
#[allow(dead_code)]
pub async fn create_test_driver() -> (TempDir, SqliteDriver) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let driver = SqliteDriver::connect(&dir.path().join("traces.db"))
        .await
        .expect("Failed to open test database");
    (dir, driver)
}

#[allow(dead_code)]
pub fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

#[allow(dead_code)]
pub fn make_span(id: u64, start: DateTime<Utc>) -> Span {
    let mut tags = BTreeMap::new();
    tags.insert("span.kind".to_string(), "server".to_string());
    Span {
        trace_id_high: 0,
        trace_id_low: id / 10,
        span_id: id,
        service_name: "frontend".to_string(),
        operation_name: format!("GET /item/{}", id),
        flags: 1,
        start_time: start,
        duration: Duration::from_millis(3),
        tags,
    }
}

/// Counts the rows in `table`.
#[allow(dead_code)]
pub async fn count_rows(driver: &SqliteDriver, table: &str) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM \"{}\"", table);
    sqlx::query_scalar(&sql)
        .fetch_one(driver.pool())
        .await
        .expect("Failed to count rows")
}
