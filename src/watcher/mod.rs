//! Partition watcher.
//!
//! A background loop that keeps a sliding window of time partitions alive
//! for every managed logical table: buckets covering `[now - expiration,
//! now + lookahead]` are created ahead of time, and buckets that end before
//! `now - expiration` are dropped. Each tick is independent and idempotent,
//! so several watcher processes may run against the same namespace.

mod ready;
mod tick;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::{
    DEFAULT_OPERATION_TIMEOUT, DEFAULT_PARTITION_WIDTH, DEFAULT_TABLE_PATH, DEFAULT_WATCHER_AGE,
    DEFAULT_WATCHER_LOOKAHEAD, MAX_PARTITIONS_PER_TABLE, TBL_TRACES,
};
use crate::error_handling::{ConfigError, OperationStats};
use crate::schema::{partition_from_time, DbPath, PartitionKey};
use crate::storage::StorageDriver;

pub use ready::ReadySignal;
pub use tick::TickReport;

#[derive(Debug, Clone)]
pub struct WatcherOptions {
    /// Retention age; must be greater than zero
    pub expiration: Duration,
    /// How far ahead of now partitions are created
    pub lookahead: Duration,
    /// Partition width, at least one second
    pub width: Duration,
    /// Namespace the partition tables live under
    pub db_path: DbPath,
    /// Logical tables to manage
    pub tables: Vec<String>,
    /// Deadline for each create, drop and listing call
    pub operation_timeout: Duration,
}

impl Default for WatcherOptions {
    fn default() -> Self {
        WatcherOptions {
            expiration: DEFAULT_WATCHER_AGE,
            lookahead: DEFAULT_WATCHER_LOOKAHEAD,
            width: DEFAULT_PARTITION_WIDTH,
            db_path: DbPath::new(DEFAULT_TABLE_PATH, ""),
            tables: vec![TBL_TRACES.to_string()],
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl WatcherOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expiration.is_zero() {
            return Err(ConfigError::NonPositiveExpiration(self.expiration));
        }
        let width = self.width.as_secs();
        if width == 0 {
            return Err(ConfigError::ZeroWidth(self.width));
        }
        if self.tables.is_empty() {
            return Err(ConfigError::EmptyTables);
        }
        let count = self
            .expiration
            .as_secs()
            .saturating_add(self.lookahead.as_secs())
            / width
            + 2;
        if count > MAX_PARTITIONS_PER_TABLE {
            return Err(ConfigError::TooManyPartitions {
                count,
                max: MAX_PARTITIONS_PER_TABLE,
            });
        }
        Ok(())
    }
}

pub struct Watcher {
    driver: Arc<dyn StorageDriver>,
    stats: Arc<OperationStats>,
    opts: WatcherOptions,
}

impl Watcher {
    /// Builds a watcher, rejecting options it must never run with.
    pub fn new(
        opts: WatcherOptions,
        driver: Arc<dyn StorageDriver>,
        stats: Arc<OperationStats>,
    ) -> Result<Self, ConfigError> {
        opts.validate()?;
        Ok(Watcher {
            driver,
            stats,
            opts,
        })
    }

    pub fn options(&self) -> &WatcherOptions {
        &self.opts
    }

    /// Buckets that must exist at `now`, oldest first.
    ///
    /// The first entry is the bucket containing `now - expiration`; anything
    /// older is eligible for dropping.
    pub fn required_partitions(&self, now: DateTime<Utc>) -> Vec<PartitionKey> {
        let oldest = now
            .checked_sub_signed(to_delta(self.opts.expiration))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let newest = now
            .checked_add_signed(to_delta(self.opts.lookahead))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let last = partition_from_time(newest, self.opts.width);
        let mut key = partition_from_time(oldest, self.opts.width);
        let mut keys = Vec::new();
        loop {
            keys.push(key);
            if key >= last {
                break;
            }
            key = key.next();
        }
        keys
    }

    /// Starts the loop. The first tick runs immediately; the returned signal
    /// turns ready once it has completed.
    pub fn spawn(self, every: Duration, shutdown: CancellationToken) -> (JoinHandle<()>, ReadySignal) {
        let (ready_tx, ready) = ReadySignal::channel();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(every.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        log::info!("Partition watcher stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let report = self.tick().await;
                        report.log();
                        ready_tx.send_replace(true);
                    }
                }
            }
        });
        (handle, ready)
    }
}

fn to_delta(d: Duration) -> TimeDelta {
    TimeDelta::from_std(d).unwrap_or(TimeDelta::MAX)
}
