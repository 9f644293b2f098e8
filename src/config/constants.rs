//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the application,
//! including timeouts, size limits, header names and other operational parameters.

use std::time::Duration;

/// Default applications file, used when neither `--config` nor `YAML_PATH` is set.
pub const DEFAULT_CONFIG_PATH: &str = "config/dev.applications.yml";

/// Configuration files that may be loaded without `--skip-allowlist-check`.
///
/// Paths are compared after lexical cleaning, so `./config/dev.applications.yml`
/// is accepted as well.
pub const ALLOWED_CONFIG_PATHS: &[&str] = &[
    "config/dev.applications.yml",
    "config/primo_ve.applications.yml",
    "config/prod.applications.yml",
    "config/saas.applications.yml",
];

/// Per-request timeout applied when an application does not declare one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of applications probed at the same time.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// User-Agent sent with every probe.
///
/// Identifies the monitor so operators of the probed services can tell
/// synthetic traffic apart from real visitors.
pub const DEFAULT_USER_AGENT: &str = "SyntheticChecks-MonitoringService (HealthCheck)";

// Redirect handling
/// Maximum number of redirect hops the content probe follows before giving up.
pub const MAX_REDIRECT_HOPS: usize = 10;

// Header names
/// Content Security Policy header
pub const HEADER_CONTENT_SECURITY_POLICY: &str = "Content-Security-Policy";

// Message limits
/// Maximum number of characters of an actual response body quoted in a
/// content-failure message. Slack rejects very long messages, and the full
/// body of a landing page is rarely useful in a chat channel.
pub const MAX_CONTENT_PREVIEW_CHARS: usize = 2000;

// Reporting sinks
/// Default Slack Web API base URL.
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
/// Default job name used when pushing to the aggregation gateway.
pub const DEFAULT_METRICS_JOB: &str = "monitoring";
/// Name of the failure counter pushed to the aggregation gateway.
pub const FAILED_CHECKS_METRIC: &str = "synthetic_checks_failed";
/// Help text of the failure counter.
pub const FAILED_CHECKS_METRIC_HELP: &str = "Failed synthetic check.";
/// Default deployment environment label.
pub const DEFAULT_ENVIRONMENT: &str = "dev";
