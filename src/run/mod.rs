//! Command entry points.
//!
//! Each command follows the same shape: `init_service_resources` validates
//! the configuration and opens the database, the command builds the
//! components it needs from those resources, and `finalize_service` stops
//! background loops and reports counters.

mod drop_tables;
mod finalize;
mod ingest;
mod init;
mod resources;
mod service;

pub use drop_tables::{drop_all_tables, drop_tables};
pub use finalize::finalize_service;
pub use ingest::{ingest_file, ingest_reader, IngestReport};
pub use init::init_service_resources;
pub use resources::ServiceResources;
pub use service::run_watcher;
