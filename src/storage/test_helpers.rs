//! In-memory storage driver for unit tests.
//!
//! Records every call in order and lets tests inject failures per table,
//! delays, and scripted discovery results.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error_handling::DriverError;
use crate::storage::driver::{DirectoryEntry, Endpoint, StorageDriver};
use crate::storage::models::SpanRow;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(String),
    Drop(String),
    Upsert(String, Vec<SpanRow>),
    List(String),
    Discover,
}

#[derive(Default)]
pub struct MockDriver {
    /// Full paths of existing tables.
    tables: Mutex<BTreeSet<String>>,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<String>>,
    fail_listing: Mutex<bool>,
    /// When set, creates report `AlreadyExists` even for missing tables.
    create_races: Mutex<bool>,
    /// When set, writes to tables that do not exist fail with `NotFound`.
    require_existing: Mutex<bool>,
    upsert_delay: Mutex<Option<Duration>>,
    discoveries: Mutex<VecDeque<Result<Vec<Endpoint>, String>>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let driver = Self::new();
        driver
            .tables
            .lock()
            .unwrap()
            .extend(tables.into_iter().map(Into::into));
        driver
    }

    /// Every operation on `table` fails with `Unavailable`.
    pub fn fail_table(&self, table: impl Into<String>) {
        self.failing.lock().unwrap().insert(table.into());
    }

    pub fn fail_listing(&self) {
        *self.fail_listing.lock().unwrap() = true;
    }

    pub fn simulate_create_races(&self) {
        *self.create_races.lock().unwrap() = true;
    }

    pub fn require_existing_tables(&self) {
        *self.require_existing.lock().unwrap() = true;
    }

    pub fn delay_upserts(&self, delay: Duration) {
        *self.upsert_delay.lock().unwrap() = Some(delay);
    }

    pub fn push_discovery(&self, result: Result<Vec<Endpoint>, String>) {
        self.discoveries.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tables(&self) -> BTreeSet<String> {
        self.tables.lock().unwrap().clone()
    }

    pub fn upserts(&self) -> Vec<(String, Vec<SpanRow>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upsert(table, rows) => Some((table, rows)),
                _ => None,
            })
            .collect()
    }

    pub fn creates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(table) => Some(table),
                _ => None,
            })
            .collect()
    }

    pub fn drops(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Drop(table) => Some(table),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failing(&self, table: &str) -> Result<(), DriverError> {
        if self.failing.lock().unwrap().contains(table) {
            return Err(DriverError::Unavailable(format!("injected failure for {table}")));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageDriver for MockDriver {
    async fn create_table(&self, table: &str) -> Result<(), DriverError> {
        self.record(Call::Create(table.to_string()));
        self.check_failing(table)?;
        if *self.create_races.lock().unwrap() {
            self.tables.lock().unwrap().insert(table.to_string());
            return Err(DriverError::AlreadyExists(table.to_string()));
        }
        if !self.tables.lock().unwrap().insert(table.to_string()) {
            return Err(DriverError::AlreadyExists(table.to_string()));
        }
        Ok(())
    }

    async fn drop_table(&self, table: &str) -> Result<(), DriverError> {
        self.record(Call::Drop(table.to_string()));
        self.check_failing(table)?;
        if !self.tables.lock().unwrap().remove(table) {
            return Err(DriverError::NotFound(table.to_string()));
        }
        Ok(())
    }

    async fn bulk_upsert(&self, table: &str, rows: Vec<SpanRow>) -> Result<(), DriverError> {
        self.record(Call::Upsert(table.to_string(), rows));
        let delay = *self.upsert_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failing(table)?;
        if *self.require_existing.lock().unwrap() && !self.tables.lock().unwrap().contains(table)
        {
            return Err(DriverError::NotFound(table.to_string()));
        }
        Ok(())
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>, DriverError> {
        self.record(Call::List(path.to_string()));
        if *self.fail_listing.lock().unwrap() {
            return Err(DriverError::Unavailable("listing disabled".into()));
        }
        let prefix = format!("{}/", path.trim_end_matches('/'));
        Ok(self
            .tables
            .lock()
            .unwrap()
            .iter()
            .filter_map(|t| t.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(DirectoryEntry::table)
            .collect())
    }

    async fn discover_endpoints(&self) -> Result<Vec<Endpoint>, DriverError> {
        self.record(Call::Discover);
        match self.discoveries.lock().unwrap().pop_front() {
            Some(Ok(endpoints)) => Ok(endpoints),
            Some(Err(message)) => Err(DriverError::Unavailable(message)),
            None => Ok(Vec::new()),
        }
    }
}
