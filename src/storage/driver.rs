//! Storage driver interface.
//!
//! The driver owns the backend connection (or session pool). The core only
//! calls the operations below and bounds each call with its own deadline
//! through `with_deadline`.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error_handling::DriverError;
use crate::storage::models::SpanRow;

/// Kind of an entry returned by `StorageDriver::list_directory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Table,
    Directory,
    Other,
}

/// One child of a listed directory. `name` is relative to the listed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirectoryEntry {
    pub fn table(name: impl Into<String>) -> Self {
        DirectoryEntry {
            name: name.into(),
            kind: EntryKind::Table,
        }
    }

    pub fn is_table(&self) -> bool {
        self.kind == EntryKind::Table
    }
}

/// A backend node as reported by topology discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Stable node identifier; the monitor sorts by it.
    pub node_id: u32,
    pub address: String,
}

/// Backend operations used by the watcher, the writer and the monitor.
///
/// Implementations report a create on an existing table as
/// `DriverError::AlreadyExists` and a drop or write on a missing table as
/// `DriverError::NotFound`.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Creates a span table at the full path `table`.
    async fn create_table(&self, table: &str) -> Result<(), DriverError>;

    async fn drop_table(&self, table: &str) -> Result<(), DriverError>;

    /// Inserts or overwrites all `rows` in one call.
    async fn bulk_upsert(&self, table: &str, rows: Vec<SpanRow>) -> Result<(), DriverError>;

    /// Lists the direct children of `path`.
    async fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>, DriverError>;

    async fn discover_endpoints(&self) -> Result<Vec<Endpoint>, DriverError>;
}

/// Runs a driver call under `deadline`.
///
/// On expiry the call's future is dropped, which releases any session it
/// held, and `DriverError::Timeout` is returned for `table`.
pub async fn with_deadline<T, F>(table: &str, deadline: Duration, fut: F) -> Result<T, DriverError>
where
    F: Future<Output = Result<T, DriverError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(DriverError::Timeout {
            table: table.to_string(),
            timeout: deadline,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_deadline_passes_result_through() {
        let ok: Result<u8, DriverError> =
            with_deadline("t", Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(ok.expect("no timeout"), 7);

        let err: Result<(), DriverError> = with_deadline("t", Duration::from_secs(1), async {
            Err(DriverError::NotFound("t".into()))
        })
        .await;
        assert!(matches!(err, Err(DriverError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_with_deadline_times_out() {
        let result: Result<(), DriverError> =
            with_deadline("db/slow", Duration::from_millis(10), async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        match result {
            Err(DriverError::Timeout { table, timeout }) => {
                assert_eq!(table, "db/slow");
                assert_eq!(timeout, Duration::from_millis(10));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
