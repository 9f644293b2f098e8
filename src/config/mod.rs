//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, header names, etc.)
//! - CLI option types and parsing
//! - Loading and validation of the applications YAML file

mod constants;
pub(crate) mod duration;
mod loader;
mod types;

// Re-export all constants
pub use constants::*;
pub use duration::parse_duration;
pub use loader::{contains_app, load_applications, ApplicationsFile};
pub use types::{Config, LogFormat, LogLevel, ReportOptions};
