//! One reconciliation pass of the partition watcher.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::error_handling::{is_benign_create_error, is_benign_drop_error, ErrorType};
use crate::schema::PartitionKey;
use crate::storage::with_deadline;

use super::Watcher;

/// Outcome counts of a single tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tables this tick created
    pub created: usize,
    /// Creates that found the table already there (another watcher won the race)
    pub already_present: usize,
    pub dropped: usize,
    /// Drops that found the table already gone
    pub already_gone: usize,
    /// Create or drop calls that failed for any other reason
    pub failed: usize,
    /// The namespace could not be listed; drops were skipped
    pub listing_failed: bool,
}

impl TickReport {
    pub fn log(&self) {
        if self.created + self.dropped + self.failed > 0 || self.listing_failed {
            log::info!(
                "Partition tick: created={} dropped={} failed={} listing_failed={}",
                self.created,
                self.dropped,
                self.failed,
                self.listing_failed
            );
        } else {
            log::debug!(
                "Partition tick: nothing to do (raced creates={}, raced drops={})",
                self.already_present,
                self.already_gone
            );
        }
    }
}

impl Watcher {
    /// Runs one tick against the current wall clock.
    pub async fn tick(&self) -> TickReport {
        self.tick_at(Utc::now()).await
    }

    /// Runs one tick as if the time were `now`.
    ///
    /// Never fails as a whole: every failed call is logged, counted, and the
    /// remaining calls still run.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::default();
        let required = self.required_partitions(now);
        let Some(oldest_kept) = required.first().copied() else {
            return report;
        };

        let existing = match self.existing_partitions().await {
            Some(existing) => existing,
            None => {
                report.listing_failed = true;
                BTreeMap::new()
            }
        };

        for logical in &self.opts.tables {
            let present = existing.get(logical.as_str());
            for key in &required {
                if present.is_some_and(|keys| keys.contains(key)) {
                    continue;
                }
                self.create_partition(logical, *key, &mut report).await;
            }
        }

        for (logical, keys) in &existing {
            for key in keys.iter().filter(|k| k.start() < oldest_kept.start()) {
                self.drop_partition(logical, *key, &mut report).await;
            }
        }

        report
    }

    /// Lists the namespace and maps each managed logical table to the
    /// buckets it currently has at the configured width.
    ///
    /// Returns `None` when the listing fails.
    async fn existing_partitions(&self) -> Option<BTreeMap<&str, BTreeSet<PartitionKey>>> {
        let path = self.opts.db_path.to_string();
        let entries = match with_deadline(
            &path,
            self.opts.operation_timeout,
            self.driver.list_directory(&path),
        )
        .await
        {
            Ok(entries) => entries,
            Err(e) => {
                self.stats.increment_error(ErrorType::DirectoryListFailed);
                log::error!("Failed to list partition tables under {}: {}", path, e);
                return None;
            }
        };

        let width = self.opts.width.as_secs();
        let mut existing: BTreeMap<&str, BTreeSet<PartitionKey>> = BTreeMap::new();
        for entry in entries.iter().filter(|e| e.is_table()) {
            for logical in &self.opts.tables {
                if let Some(key) = PartitionKey::parse_table_name(logical, &entry.name) {
                    // Buckets of another width belong to someone else's layout
                    if key.width().as_secs() == width {
                        existing.entry(logical.as_str()).or_default().insert(key);
                    }
                }
            }
        }
        Some(existing)
    }

    async fn create_partition(&self, logical: &str, key: PartitionKey, report: &mut TickReport) {
        let table = key.build_full_table_name(&self.opts.db_path.to_string(), logical);
        let result = with_deadline(
            &table,
            self.opts.operation_timeout,
            self.driver.create_table(&table),
        )
        .await;

        match result {
            Ok(()) => {
                report.created += 1;
                log::info!("Created partition table {}", table);
            }
            Err(e) if is_benign_create_error(&e) => {
                report.already_present += 1;
                log::debug!("Partition table {} already exists", table);
            }
            Err(e) => {
                report.failed += 1;
                self.stats.increment_error(ErrorType::PartitionCreateFailed);
                log::error!("Failed to create partition table {}: {}", table, e);
            }
        }
    }

    async fn drop_partition(&self, logical: &str, key: PartitionKey, report: &mut TickReport) {
        let table = key.build_full_table_name(&self.opts.db_path.to_string(), logical);
        let result = with_deadline(
            &table,
            self.opts.operation_timeout,
            self.driver.drop_table(&table),
        )
        .await;

        match result {
            Ok(()) => {
                report.dropped += 1;
                log::info!("Dropped expired partition table {}", table);
            }
            Err(e) if is_benign_drop_error(&e) => {
                report.already_gone += 1;
                log::debug!("Partition table {} already dropped", table);
            }
            Err(e) => {
                report.failed += 1;
                self.stats.increment_error(ErrorType::PartitionDropFailed);
                log::error!("Failed to drop partition table {}: {}", table, e);
            }
        }
    }
}
