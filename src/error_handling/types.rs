//! Error type definitions.
//!
//! This module defines all error types used throughout the application, one
//! enum per layer: initialization, configuration, probing, dispatch and the
//! run as a whole.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for loading the applications file.
///
/// Any of these aborts the run before a single application is probed.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file is not in the configuration allow-list.
    #[error("config file path is not allowed: {}", .0.display())]
    PathNotAllowed(PathBuf),

    /// The file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML or does not have the expected shape.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An application lacks `name`, `url` or `expected_status`.
    #[error(
        "config file is missing one or more required fields: name, url, expected_status (application #{index})"
    )]
    MissingRequiredFields {
        /// Zero-based position of the offending application
        index: usize,
    },

    /// Two applications share the same name.
    #[error("application name '{0}' is declared more than once")]
    DuplicateName(String),
}

/// Error types for a single probe.
///
/// A probe error never aborts the run: it turns the application's verdict into
/// a failure.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The HTTP request itself failed (DNS, connect, timeout, body read, ...).
    #[error("{kind}: {source}")]
    Request {
        /// Category of the failure
        kind: ErrorType,
        /// Underlying reqwest error
        #[source]
        source: ReqwestError,
    },

    /// The content probe did not reach its final page within the
    /// application's timeout.
    #[error("HTTP request timeout error: redirect chain not completed within {0:?}")]
    Timeout(std::time::Duration),

    /// The content probe hit the redirect cap.
    #[error("stopped after {0} redirects")]
    TooManyRedirects(usize),

    /// A redirect pointed somewhere that cannot be resolved to a URL.
    #[error("invalid redirect location {location:?} from {from}")]
    InvalidRedirect {
        /// URL that answered with the redirect
        from: String,
        /// Raw `Location` header value
        location: String,
    },
}

impl From<ReqwestError> for ProbeError {
    fn from(source: ReqwestError) -> Self {
        ProbeError::Request {
            kind: super::categorize_reqwest_error(&source),
            source,
        }
    }
}

impl ProbeError {
    /// Category of this error, for logging.
    pub fn error_type(&self) -> ErrorType {
        match self {
            ProbeError::Request { kind, .. } => *kind,
            ProbeError::Timeout(_) => ErrorType::HttpRequestTimeoutError,
            ProbeError::TooManyRedirects(_) | ProbeError::InvalidRedirect { .. } => {
                ErrorType::HttpRequestRedirectError
            }
        }
    }
}

/// Error types for reporting failures to a sink.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A setting the selected sink needs was not provided.
    #[error("{0} is not set")]
    MissingSetting(&'static str),

    /// The HTTP call to the sink failed.
    #[error("request to {target} failed: {source}")]
    Http {
        /// Human-readable name of the sink endpoint
        target: &'static str,
        /// Underlying reqwest error
        #[source]
        source: ReqwestError,
    },

    /// Slack answered but refused the call.
    #[error("slack API error: {0}")]
    SlackApi(String),

    /// The aggregation gateway rejected the push.
    #[error("metrics push rejected with status {status}: {body}")]
    MetricsPush {
        /// HTTP status returned by the gateway
        status: u16,
        /// Response body returned by the gateway
        body: String,
    },
}

/// Run-level errors returned by the orchestrator.
#[derive(Error, Debug)]
pub enum RunError {
    /// The requested application is not declared.
    #[error("app '{0}' not found in config file")]
    TargetNotFound(String),

    /// Failures were found but could not be reported.
    #[error("failed to dispatch check failures: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Types of transport errors that can occur while probing an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    /// The request could not be built (malformed URL, bad header).
    HttpRequestBuilderError,
    /// A redirect could not be followed.
    HttpRequestRedirectError,
    /// The request or the redirect chain exceeded its timeout.
    HttpRequestTimeoutError,
    /// The request failed while being sent.
    HttpRequestRequestError,
    /// No connection could be established.
    HttpRequestConnectError,
    /// The response body could not be read.
    HttpRequestBodyError,
    /// The response body could not be decoded.
    HttpRequestDecodeError,
    /// Any other transport failure.
    HttpRequestOtherError,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    /// Human-readable name used in logs and verdict messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::HttpRequestBuilderError => "HTTP request builder error",
            ErrorType::HttpRequestRedirectError => "HTTP request redirect error",
            ErrorType::HttpRequestTimeoutError => "HTTP request timeout error",
            ErrorType::HttpRequestRequestError => "HTTP request error",
            ErrorType::HttpRequestConnectError => "HTTP request connect error",
            ErrorType::HttpRequestBodyError => "HTTP request body error",
            ErrorType::HttpRequestDecodeError => "HTTP request decode error",
            ErrorType::HttpRequestOtherError => "HTTP request other error",
        }
    }
}
