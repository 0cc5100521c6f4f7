//! Process-wide initialization.
//!
//! Logger setup lives here; storage setup is in `storage::pool`.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
