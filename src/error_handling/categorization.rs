//! Driver error categorization.
//!
//! Maps `DriverError`s to the `ErrorType` they are counted under, and decides
//! which lifecycle outcomes count as success.

use super::types::{DriverError, ErrorType};

/// Categorizes a failed bulk write.
pub fn categorize_write_error(error: &DriverError) -> ErrorType {
    match error {
        DriverError::Timeout { .. } => ErrorType::BulkWriteTimeout,
        _ => ErrorType::BulkWriteFailed,
    }
}

/// Returns `true` when a create-table error means another process got there first.
pub fn is_benign_create_error(error: &DriverError) -> bool {
    matches!(error, DriverError::AlreadyExists(_))
}

/// Returns `true` when a drop-table error means the table is already gone.
pub fn is_benign_drop_error(error: &DriverError) -> bool {
    matches!(error, DriverError::NotFound(_))
}
