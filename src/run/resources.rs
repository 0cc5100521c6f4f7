//! Shared resources of one command run.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error_handling::{ConfigError, OperationStats};
use crate::monitor::{ConnectionMonitor, MonitorHandle};
use crate::storage::{SqliteDriver, StorageDriver};
use crate::watcher::Watcher;
use crate::writer::{BatchWriter, WriteMetrics};

/// Everything a command needs, created once by `init_service_resources`.
///
/// Components are built from here and receive their collaborators
/// explicitly; nothing is registered globally.
pub struct ServiceResources {
    pub config: Config,
    /// Concrete driver, kept for pool maintenance at shutdown
    pub sqlite: SqliteDriver,
    pub driver: Arc<dyn StorageDriver>,
    pub stats: Arc<OperationStats>,
    pub metrics: Arc<WriteMetrics>,
    /// Cancelled once to stop every background loop
    pub shutdown: CancellationToken,
    pub start_time: Instant,
}

impl ServiceResources {
    pub fn monitor(&self) -> (ConnectionMonitor, MonitorHandle) {
        ConnectionMonitor::new(
            Arc::clone(&self.driver),
            self.config.monitor_options(),
            Arc::clone(&self.stats),
        )
    }

    pub fn watcher(&self) -> Result<Watcher, ConfigError> {
        Watcher::new(
            self.config.watcher_options(),
            Arc::clone(&self.driver),
            Arc::clone(&self.stats),
        )
    }

    pub fn writer(&self, monitor: MonitorHandle) -> BatchWriter {
        BatchWriter::new(
            Arc::clone(&self.driver),
            monitor,
            Arc::clone(&self.metrics),
            Arc::clone(&self.stats),
            self.config.writer_options(),
        )
    }
}
