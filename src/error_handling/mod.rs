//! Error handling.
//!
//! This module provides:
//! - Error type definitions for every layer of a run
//! - Categorization of transport errors into `ErrorType`
//!
//! Only configuration, selection and dispatch errors abort a run. Transport
//! errors stay local to the application being probed and surface as a failed
//! verdict.

mod categorization;
mod types;

// Re-export public API
pub use categorization::categorize_reqwest_error;
pub use types::{
    ConfigError, DispatchError, ErrorType, InitializationError, ProbeError, RunError,
};
