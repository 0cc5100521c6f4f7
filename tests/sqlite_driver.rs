//! `SqliteDriver` against a real database file.

mod helpers;

use helpers::{at, count_rows, create_test_driver, make_span};
use partitioned_trace_store::storage::{DirectoryEntry, EntryKind, SpanRow, StorageDriver};
use partitioned_trace_store::DriverError;

const TABLE: &str = "trace_store/traces_20240310140000_3600s";

#[tokio::test]
async fn test_create_then_create_again_reports_already_exists() {
    let (_dir, driver) = create_test_driver().await;

    driver.create_table(TABLE).await.expect("first create succeeds");
    let second = driver.create_table(TABLE).await;

    assert!(
        matches!(second, Err(DriverError::AlreadyExists(ref t)) if t == TABLE),
        "unexpected result: {:?}",
        second
    );
}

#[tokio::test]
async fn test_drop_missing_table_reports_not_found() {
    let (_dir, driver) = create_test_driver().await;

    driver.create_table(TABLE).await.expect("create succeeds");
    driver.drop_table(TABLE).await.expect("drop succeeds");
    let again = driver.drop_table(TABLE).await;

    assert!(matches!(again, Err(DriverError::NotFound(_))), "{:?}", again);
}

#[tokio::test]
async fn test_write_to_missing_table_reports_not_found() {
    let (_dir, driver) = create_test_driver().await;
    let row = SpanRow::from(&make_span(1, at("2024-03-10T14:10:00Z")));

    let result = driver.bulk_upsert(TABLE, vec![row]).await;
    assert!(matches!(result, Err(DriverError::NotFound(_))), "{:?}", result);
}

#[tokio::test]
async fn test_bulk_upsert_overwrites_same_ids() {
    let (_dir, driver) = create_test_driver().await;
    driver.create_table(TABLE).await.expect("create succeeds");

    let rows: Vec<SpanRow> = (1..=5)
        .map(|id| SpanRow::from(&make_span(id, at("2024-03-10T14:10:00Z"))))
        .collect();
    driver
        .bulk_upsert(TABLE, rows.clone())
        .await
        .expect("first write succeeds");
    driver
        .bulk_upsert(TABLE, rows)
        .await
        .expect("rewrite succeeds");

    assert_eq!(count_rows(&driver, TABLE).await, 5);
}

#[tokio::test]
async fn test_list_directory_returns_direct_children() {
    let (_dir, driver) = create_test_driver().await;
    for table in [
        "trace_store/traces_20240310140000_3600s",
        "trace_store/traces_20240310150000_3600s",
        "trace_store/staging/traces_20240310140000_3600s",
        "elsewhere/traces_20240310140000_3600s",
    ] {
        driver.create_table(table).await.expect("create succeeds");
    }

    let entries = driver
        .list_directory("trace_store")
        .await
        .expect("listing succeeds");

    assert_eq!(
        entries,
        vec![
            DirectoryEntry {
                name: "staging".to_string(),
                kind: EntryKind::Directory,
            },
            DirectoryEntry::table("traces_20240310140000_3600s"),
            DirectoryEntry::table("traces_20240310150000_3600s"),
        ]
    );
}

#[tokio::test]
async fn test_discover_reports_single_local_node() {
    let (_dir, driver) = create_test_driver().await;
    let endpoints = driver
        .discover_endpoints()
        .await
        .expect("discovery succeeds");
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].node_id, 1);
    assert!(endpoints[0].address.ends_with("traces.db"));
}
