//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration. Every option can also be supplied through the environment,
//! which is how the checks are usually scheduled (cron jobs, Kubernetes CronJobs).

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_CONFIG_PATH, DEFAULT_ENVIRONMENT, DEFAULT_MAX_CONCURRENCY, DEFAULT_METRICS_JOB,
    DEFAULT_SLACK_API_URL, DEFAULT_USER_AGENT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Options that change how verdicts are explained, without changing the verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Log every probe and redirect hop.
    pub debug: bool,
    /// Quote the actual response body in content-failure messages.
    pub show_actual_content: bool,
}

/// Run configuration.
///
/// Parsed from the command line with environment fallbacks, or constructed
/// programmatically for library use.
///
/// # Examples
///
/// ```no_run
/// use synthetic_checks::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     config: PathBuf::from("config/prod.applications.yml"),
///     output_slack: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "synthetic_checks", version, about)]
pub struct Config {
    /// Name of a single application to check (all applications when omitted)
    pub target: Option<String>,

    /// Applications YAML file
    #[arg(long, env = "YAML_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Load configuration files outside the allow-list
    #[arg(long, env = "SKIP_WHITELIST_CHECK", value_parser = FalseyValueParser::new())]
    pub skip_allowlist_check: bool,

    /// Post failures to Slack instead of pushing failure metrics
    #[arg(long, env = "OUTPUT_SLACK", value_parser = FalseyValueParser::new())]
    pub output_slack: bool,

    /// Slack bot token
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    pub slack_token: Option<String>,

    /// Slack channel receiving failure messages
    #[arg(long, env = "SLACK_CHANNEL_ID")]
    pub slack_channel: Option<String>,

    /// Slack Web API base URL
    #[arg(long, env = "SLACK_API_URL", default_value = DEFAULT_SLACK_API_URL)]
    pub slack_api_url: String,

    /// Call Slack `auth.test` before posting failures
    #[arg(long, env = "VALIDATE_SLACK_CREDENTIALS", value_parser = FalseyValueParser::new())]
    pub validate_slack_credentials: bool,

    /// Prometheus aggregation gateway receiving failure counters
    #[arg(long, env = "PROM_AGGREGATION_GATEWAY_URL")]
    pub prom_aggregation_gateway_url: Option<String>,

    /// Job name used for the metrics push
    #[arg(long, env = "METRICS_JOB", default_value = DEFAULT_METRICS_JOB)]
    pub metrics_job: String,

    /// Deployment environment, attached to failure metrics
    #[arg(long, env = "ENV", default_value = DEFAULT_ENVIRONMENT)]
    pub environment: String,

    /// Cluster description included in logs
    #[arg(long, env = "CLUSTER_INFO")]
    pub cluster_info: Option<String>,

    /// Log every probe and redirect hop
    #[arg(long, env = "DEBUG_MODE", value_parser = FalseyValueParser::new())]
    pub debug: bool,

    /// Quote the actual page content in content-failure messages
    #[arg(long, env = "SHOW_ACTUAL_CONTENT", value_parser = FalseyValueParser::new())]
    pub show_actual_content: bool,

    /// Maximum number of applications probed concurrently
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    /// Verdict message options derived from this configuration.
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            debug: self.debug,
            show_actual_content: self.show_actual_content,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: None,
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            skip_allowlist_check: false,
            output_slack: false,
            slack_token: None,
            slack_channel: None,
            slack_api_url: DEFAULT_SLACK_API_URL.to_string(),
            validate_slack_credentials: false,
            prom_aggregation_gateway_url: None,
            metrics_job: DEFAULT_METRICS_JOB.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            cluster_info: None,
            debug: false,
            show_actual_content: false,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
