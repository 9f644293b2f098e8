//! Expectation records.

use std::time::Duration;

use serde::Deserialize;

use crate::config::DEFAULT_TIMEOUT;

/// One application to check, as declared in the applications file.
///
/// Only `name`, `url` and `expected_status_code` are required. Empty optional
/// fields disable the corresponding check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Application {
    /// Unique, case-sensitive identifier
    #[serde(default)]
    pub name: String,
    /// Absolute URL to probe
    #[serde(default)]
    pub url: String,
    /// Status code the status probe must observe
    #[serde(default, rename = "expected_status", alias = "expected_status_code")]
    pub expected_status_code: u16,
    /// Per-request timeout; `None` or zero means `DEFAULT_TIMEOUT`
    #[serde(default, deserialize_with = "crate::config::duration::deserialize_timeout")]
    pub timeout: Option<Duration>,
    /// Required `Location` header (absolute or path-relative)
    #[serde(default, alias = "expected_redirect_location")]
    pub expected_location: String,
    /// Substring the final landing page must contain
    #[serde(default)]
    pub expected_content: String,
    /// Exact `Content-Security-Policy` header value
    #[serde(default)]
    pub expected_csp: String,
}

impl Application {
    /// Creates an application with only the required fields set.
    pub fn new(name: impl Into<String>, url: impl Into<String>, expected_status_code: u16) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            expected_status_code,
            ..Default::default()
        }
    }

    /// Timeout applied to each request made for this application.
    pub fn timeout(&self) -> Duration {
        match self.timeout {
            Some(timeout) if !timeout.is_zero() => timeout,
            _ => DEFAULT_TIMEOUT,
        }
    }

    /// Whether a content probe is required.
    pub fn needs_content_probe(&self) -> bool {
        !self.expected_content.is_empty()
    }

    /// Whether `name`, `url` and a non-zero status are all present.
    pub fn has_required_fields(&self) -> bool {
        !self.name.is_empty() && !self.url.is_empty() && self.expected_status_code != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_defaults_when_missing_or_zero() {
        let mut app = Application::new("home", "https://example.com", 200);
        assert_eq!(app.timeout(), DEFAULT_TIMEOUT);

        app.timeout = Some(Duration::ZERO);
        assert_eq!(app.timeout(), DEFAULT_TIMEOUT);

        app.timeout = Some(Duration::from_millis(800));
        assert_eq!(app.timeout(), Duration::from_millis(800));
    }

    #[test]
    fn test_required_fields() {
        assert!(Application::new("home", "https://example.com", 200).has_required_fields());
        assert!(!Application::new("", "https://example.com", 200).has_required_fields());
        assert!(!Application::new("home", "", 200).has_required_fields());
        assert!(!Application::new("home", "https://example.com", 0).has_required_fields());
    }

    #[test]
    fn test_deserialize_full_record() {
        let yaml = r#"
name: catalog
url: https://catalog.example.com
expected_status: 301
timeout: 800ms
expected_location: /login
expected_content: Welcome
expected_csp: "default-src 'self'"
"#;
        let app: Application = serde_yaml::from_str(yaml).expect("valid record");
        assert_eq!(app.name, "catalog");
        assert_eq!(app.expected_status_code, 301);
        assert_eq!(app.timeout(), Duration::from_millis(800));
        assert_eq!(app.expected_location, "/login");
        assert!(app.needs_content_probe());
        assert_eq!(app.expected_csp, "default-src 'self'");
    }

    #[test]
    fn test_deserialize_integer_timeout_as_seconds() {
        let yaml = "name: a\nurl: https://a.example\nexpected_status: 200\ntimeout: 3\n";
        let app: Application = serde_yaml::from_str(yaml).expect("valid record");
        assert_eq!(app.timeout(), Duration::from_secs(3));
        assert!(!app.needs_content_probe());
    }

    #[test]
    fn test_deserialize_rejects_bad_timeout() {
        let yaml = "name: a\nurl: https://a.example\nexpected_status: 200\ntimeout: soon\n";
        assert!(serde_yaml::from_str::<Application>(yaml).is_err());
    }
}
