//! Utility functions.
//!
//! This module provides:
//! - String sanitization utilities for text quoted in messages

pub mod sanitize;
