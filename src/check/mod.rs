//! Endpoint checks.
//!
//! This module turns one declared application into one verdict:
//! - `application`: the expectation record
//! - `probe`: the status and content HTTP probes
//! - `compare`: location, content and CSP comparators
//! - `verdict`: verdict assembly and its explanatory message

mod application;
pub mod compare;
mod probe;
mod verdict;

pub use application::Application;
pub use compare::{locations_match, match_content, match_csp};
pub use probe::{
    fetch_following_redirects, ContentObservation, HttpProbe, Probe, ProbeObservation,
    StatusObservation,
};
pub use verdict::CheckVerdict;
