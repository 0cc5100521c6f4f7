// storage/mod.rs
// Storage driver interface, span rows, and the SQLite driver

pub mod driver;
pub mod models;
pub mod pool;
pub mod sqlite;

#[cfg(test)]
pub mod test_helpers;

// Re-export commonly used items
pub use driver::{with_deadline, DirectoryEntry, Endpoint, EntryKind, StorageDriver};
pub use models::{Span, SpanRow};
pub use pool::init_db_pool_with_path;
pub use sqlite::SqliteDriver;
