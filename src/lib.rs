//! synthetic_checks library: endpoint health checks for declared web applications
//!
//! This library probes each declared application over HTTP, compares what it
//! observes with the declared expectations (status code, redirect location,
//! page content and Content-Security-Policy), and reports the failing checks
//! to Slack or to a Prometheus aggregation gateway.
//!
//! # Example
//!
//! ```no_run
//! use synthetic_checks::{run, Config};
//! use tokio;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     config: std::path::PathBuf::from("config/prod.applications.yml"),
//!     output_slack: true,
//!     ..Default::default()
//! };
//!
//! let report = run(config).await?;
//! println!("Evaluated {} applications: {} failed",
//!          report.evaluated, report.failures.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod check;
pub mod config;
mod error_handling;
pub mod initialization;
mod run;
pub mod sink;
mod utils;

// Re-export public API
pub use check::{Application, CheckVerdict, HttpProbe, Probe};
pub use config::{load_applications, Config, LogFormat, LogLevel, ReportOptions};
pub use error_handling::{
    categorize_reqwest_error, ConfigError, DispatchError, ErrorType, InitializationError,
    ProbeError, RunError,
};
pub use run::{run, run_checks, RunReport};
pub use sink::{MetricsSink, ReportSink, Sink, SlackSink};
