//! Error handling and failure statistics.
//!
//! This module provides:
//! - Error type definitions (driver, configuration, initialization)
//! - Failure categorization for driver errors
//! - Thread-safe failure counters
//!
//! No operation in this crate retries on its own. A failure is isolated to
//! one partition group or one bucket operation, logged, and counted here.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_write_error, is_benign_create_error, is_benign_drop_error};
pub use stats::OperationStats;
pub use types::{ConfigError, DriverError, ErrorType, InitializationError};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_operation_stats_initialization() {
        let stats = OperationStats::new();
        for error_type in ErrorType::iter() {
            assert_eq!(stats.get_error_count(error_type), 0);
        }
    }

    #[test]
    fn test_operation_stats_increment() {
        let stats = OperationStats::new();
        stats.increment_error(ErrorType::BulkWriteFailed);
        stats.increment_error(ErrorType::BulkWriteFailed);
        stats.increment_error(ErrorType::PartitionDropFailed);
        assert_eq!(stats.get_error_count(ErrorType::BulkWriteFailed), 2);
        assert_eq!(stats.get_error_count(ErrorType::PartitionDropFailed), 1);
        assert_eq!(stats.total_errors(), 3);
    }
}
