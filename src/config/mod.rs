//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (intervals, timeouts, capacities)
//! - The library `Config` and its validation
//! - CLI option types and parsing

mod cli;
mod constants;
mod types;

pub use cli::{Cli, Command};
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
