//! Partition keys.
//!
//! A partition is the half-open interval `[start, start + width)` where
//! `start` is a multiple of `width` counted from the Unix epoch. Pre-epoch
//! timestamps floor towards negative infinity, so every instant belongs to
//! exactly one bucket at a given width.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

const SUFFIX_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Identifies one fixed-width time bucket.
///
/// Ordering is by bucket start, then width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionKey {
    /// Bucket start in seconds since the Unix epoch.
    start: i64,
    /// Bucket width in whole seconds, always at least 1.
    width: i64,
}

/// Returns the bucket of width `width` that contains `t`.
///
/// Widths below one second are treated as one second; sub-second components
/// of `width` are ignored. `Config::validate` rejects such widths before they
/// reach the watcher or the writer.
pub fn partition_from_time(t: DateTime<Utc>, width: Duration) -> PartitionKey {
    let width = width_secs(width);
    PartitionKey {
        start: t.timestamp().div_euclid(width) * width,
        width,
    }
}

fn width_secs(width: Duration) -> i64 {
    i64::try_from(width.as_secs()).unwrap_or(i64::MAX).max(1)
}

impl PartitionKey {
    /// Bucket start as a UTC timestamp.
    pub fn start(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.start, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Exclusive bucket end.
    pub fn end(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.start.saturating_add(self.width), 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn width(&self) -> Duration {
        Duration::from_secs(self.width as u64)
    }

    /// The bucket immediately after this one.
    pub fn next(&self) -> PartitionKey {
        PartitionKey {
            start: self.start.saturating_add(self.width),
            width: self.width,
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start() && t < self.end()
    }

    /// Encoded suffix: `<YYYYMMDDHHMMSS>_<width seconds>s`.
    pub fn suffix(&self) -> String {
        format!(
            "{}_{}s",
            self.start().format(SUFFIX_TIME_FORMAT),
            self.width
        )
    }

    /// Name of this bucket's physical table for `logical_table`, without the base path.
    pub fn table_name(&self, logical_table: &str) -> String {
        format!("{}_{}", logical_table, self.suffix())
    }

    /// Full path of this bucket's physical table: `<base_path>/<logical_table>_<suffix>`.
    pub fn build_full_table_name(&self, base_path: &str, logical_table: &str) -> String {
        let base = base_path.trim_end_matches('/');
        if base.is_empty() {
            self.table_name(logical_table)
        } else {
            format!("{}/{}", base, self.table_name(logical_table))
        }
    }

    /// Inverse of `table_name`.
    ///
    /// Returns `None` for names that belong to another logical table, carry
    /// a malformed suffix, or whose start is not aligned to the encoded width.
    pub fn parse_table_name(logical_table: &str, name: &str) -> Option<PartitionKey> {
        let rest = name.strip_prefix(logical_table)?.strip_prefix('_')?;
        let (stamp, width) = rest.split_once('_')?;
        if stamp.len() != 14 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let width: i64 = width.strip_suffix('s')?.parse().ok()?;
        if width < 1 {
            return None;
        }
        let start = NaiveDateTime::parse_from_str(stamp, SUFFIX_TIME_FORMAT)
            .ok()?
            .and_utc()
            .timestamp();
        if start.rem_euclid(width) != 0 {
            return None;
        }
        Some(PartitionKey { start, width })
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.suffix())
    }
}
