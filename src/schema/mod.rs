//! Partition key scheme.
//!
//! Pure mapping from a timestamp and a bucket width to a partition key, and
//! from a partition key to the physical table that stores it. Nothing here
//! touches the backend.

mod db_path;
mod partition;

pub use db_path::DbPath;
pub use partition::{partition_from_time, PartitionKey};
