//! Service lifecycle helpers shared by the commands.

pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use shutdown::{shutdown_gracefully, wait_for_drain, wait_for_signal};
pub use statistics::{error_summary_lines, print_error_statistics, print_write_statistics};
