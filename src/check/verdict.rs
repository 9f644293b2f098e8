//! Verdict assembly and explanation.
//!
//! A verdict has three independent parts (status, content, CSP). The message
//! explaining it is a pure function of the verdict, built line by line in a
//! fixed order: status/location, content, CSP, transport error.

use std::fmt;

use log::warn;

use crate::check::application::Application;
use crate::check::compare::{locations_match, match_content, match_csp};
use crate::check::probe::{ContentObservation, ProbeObservation};
use crate::config::{ReportOptions, MAX_CONTENT_PREVIEW_CHARS};
use crate::error_handling::ProbeError;
use crate::utils::sanitize::sanitize_and_truncate;

/// Outcome of checking one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckVerdict {
    /// The application this verdict was computed for
    pub application: Application,
    /// Status code and (if declared) redirect location matched
    pub status_ok: bool,
    /// Content requirement satisfied, or none declared
    pub content_ok: bool,
    /// CSP requirement satisfied, or none declared
    pub csp_ok: bool,
    /// Status observed by the status probe, 0 on transport failure
    pub actual_status_code: u16,
    /// `Location` header observed by the status probe
    pub actual_location: String,
    /// Matched span on success, the whole final body on mismatch
    pub actual_content: String,
    /// `Content-Security-Policy` header observed by the status probe
    pub actual_csp: String,
    /// Transport error description, if a probe failed
    pub error: Option<String>,
    message: String,
}

impl CheckVerdict {
    /// Builds the verdict for `application` from the probe outcome.
    ///
    /// A transport error at either probe phase fails all three parts: an
    /// unreachable application cannot have satisfied anything it declared.
    pub fn assemble(
        application: &Application,
        outcome: Result<ProbeObservation, ProbeError>,
        options: &ReportOptions,
    ) -> Self {
        let mut verdict = match outcome {
            Ok(observation) => Self::from_observation(application, observation),
            Err(err) => {
                warn!(
                    "[{}] Request error ({}): {}",
                    application.name,
                    err.error_type(),
                    err
                );
                Self {
                    application: application.clone(),
                    status_ok: false,
                    content_ok: false,
                    csp_ok: false,
                    actual_status_code: 0,
                    actual_location: String::new(),
                    actual_content: String::new(),
                    actual_csp: String::new(),
                    error: Some(err.to_string()),
                    message: String::new(),
                }
            }
        };
        verdict.message = explain(&verdict, options);
        verdict
    }

    fn from_observation(application: &Application, observation: ProbeObservation) -> Self {
        let status = observation.status;

        let status_ok = status.status_code == application.expected_status_code
            && (application.expected_location.is_empty()
                || locations_match(&status.location, &application.expected_location));

        let (content_ok, actual_content) = match observation.content {
            ContentObservation::Fetched { body, .. } => {
                match_content(&body, &application.expected_content)
            }
            ContentObservation::NotRequired => (true, String::new()),
        };

        let (csp_ok, actual_csp) = if application.expected_csp.is_empty() {
            (true, String::new())
        } else {
            (
                match_csp(&status.csp, &application.expected_csp),
                status.csp,
            )
        };

        Self {
            application: application.clone(),
            status_ok,
            content_ok,
            csp_ok,
            actual_status_code: status.status_code,
            actual_location: status.location,
            actual_content,
            actual_csp,
            error: None,
            message: String::new(),
        }
    }

    /// True when all three parts passed.
    pub fn is_success(&self) -> bool {
        self.status_ok && self.content_ok && self.csp_ok
    }

    /// Human-readable explanation, one line per declared property.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CheckVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn explain(verdict: &CheckVerdict, options: &ReportOptions) -> String {
    let app = &verdict.application;
    let mut lines = vec![if verdict.status_ok {
        status_success_line(verdict)
    } else {
        status_failure_line(verdict)
    }];

    if !app.expected_content.is_empty() {
        lines.push(if verdict.content_ok {
            content_success_line(verdict)
        } else {
            content_failure_line(verdict, options)
        });
    }

    if !app.expected_csp.is_empty() {
        let line = if verdict.csp_ok {
            csp_success_line(verdict)
        } else {
            csp_failure_line(verdict)
        };
        if !line.is_empty() {
            lines.push(line);
        }
    }

    if let Some(error) = &verdict.error {
        lines.push(format!("Error: {error}"));
    }

    lines.join("\n")
}

fn status_success_line(verdict: &CheckVerdict) -> String {
    let app = &verdict.application;
    if !app.expected_location.is_empty() && !verdict.actual_location.is_empty() {
        format!(
            "Success: URL {} resolved with {}, redirect location matched {}",
            app.url, verdict.actual_status_code, verdict.actual_location
        )
    } else {
        format!(
            "Success: URL {} resolved with {}",
            app.url, verdict.actual_status_code
        )
    }
}

fn status_failure_line(verdict: &CheckVerdict) -> String {
    let app = &verdict.application;
    let actual = verdict.actual_status_code;
    let expected = app.expected_status_code;
    let status_match = actual == expected;

    let details = if !app.expected_location.is_empty() {
        let location_match = locations_match(&verdict.actual_location, &app.expected_location);
        match (status_match, location_match) {
            (false, false) => Some(format!(
                "resolved with {}, expected {}, and redirect location {} did not match {}",
                actual, expected, verdict.actual_location, app.expected_location
            )),
            (true, false) => Some(format!(
                "resolved with {}, but redirect location {} did not match {}",
                actual, verdict.actual_location, app.expected_location
            )),
            (false, true) => Some(format!(
                "resolved with {}, expected {}, but redirect location matched",
                actual, expected
            )),
            (true, true) => None,
        }
    } else if !status_match {
        Some(format!("resolved with {}, expected {}", actual, expected))
    } else {
        None
    };

    match details {
        Some(details) => format!("Failure: URL {} {}", app.url, details),
        None => format!("Unknown failure for URL {}", app.url),
    }
}

fn content_success_line(verdict: &CheckVerdict) -> String {
    if verdict.actual_content.is_empty() {
        return "No content to compare".to_string();
    }
    format!(
        "Success: Expected content {} matched actual content {}",
        verdict.application.expected_content, verdict.actual_content
    )
}

fn content_failure_line(verdict: &CheckVerdict, options: &ReportOptions) -> String {
    if verdict.actual_content.is_empty() {
        return "Failure: No content to compare".to_string();
    }
    if options.show_actual_content {
        return format!(
            "Failure: Expected content {} did not match actual content {}",
            verdict.application.expected_content,
            sanitize_and_truncate(&verdict.actual_content, MAX_CONTENT_PREVIEW_CHARS)
        );
    }
    format!(
        "Failure: Expected content {} did not match actual content",
        verdict.application.expected_content
    )
}

fn csp_success_line(verdict: &CheckVerdict) -> String {
    if verdict.actual_csp.is_empty() {
        return String::new();
    }
    "Success: Expected CSP header matched actual CSP header".to_string()
}

fn csp_failure_line(verdict: &CheckVerdict) -> String {
    if verdict.actual_csp.is_empty() {
        return "Failure: No CSP header to compare".to_string();
    }
    format!(
        "Failure: Expected CSP header did not match actual CSP header: {}",
        verdict.actual_csp
    )
}
