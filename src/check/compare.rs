//! Comparators for observed response facets.
//!
//! All functions here are pure: they only look at strings already captured by
//! the probe.

use url::{ParseError, Url};

/// Base used only to check that a relative reference is well formed.
const REFERENCE_CHECK_BASE: &str = "http://reference.invalid/";

/// A `Location` value parsed as a URI reference.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParsedLocation {
    /// Has a scheme
    Absolute(Url),
    /// No scheme. `has_host` is set for network-path references (`//host/path`).
    Reference { has_host: bool, request_uri: String },
}

impl ParsedLocation {
    fn parse(raw: &str) -> Option<Self> {
        match Url::parse(raw) {
            Ok(url) => Some(ParsedLocation::Absolute(url)),
            Err(ParseError::RelativeUrlWithoutBase) => {
                let base = Url::parse(REFERENCE_CHECK_BASE).ok()?;
                let resolved = base.join(raw).ok()?;
                Some(ParsedLocation::Reference {
                    has_host: raw.starts_with("//"),
                    request_uri: reference_request_uri(raw, &resolved),
                })
            }
            Err(_) => None,
        }
    }

    /// Path plus query, the way it would appear on an HTTP request line.
    fn request_uri(&self) -> String {
        match self {
            ParsedLocation::Absolute(url) => {
                let mut uri = url.path().to_string();
                if uri.is_empty() {
                    uri.push('/');
                }
                if let Some(query) = url.query() {
                    uri.push('?');
                    uri.push_str(query);
                }
                uri
            }
            ParsedLocation::Reference { request_uri, .. } => request_uri.clone(),
        }
    }
}

/// Percent-encoded path and query of a reference, read back from its
/// resolution against the check base so both sides of a comparison use the
/// same encoding. A relative path keeps its missing leading slash.
fn reference_request_uri(raw: &str, resolved: &Url) -> String {
    let raw_path = raw.split(['?', '#']).next().unwrap_or_default();
    let path = resolved.path();
    let mut uri = if raw_path.is_empty() || raw_path.starts_with('/') {
        path.to_string()
    } else {
        path.strip_prefix('/').unwrap_or(path).to_string()
    };
    if let Some(query) = resolved.query() {
        uri.push('?');
        uri.push_str(query);
    }
    uri
}

/// Decides whether an observed redirect target satisfies the expected one.
///
/// Rules, in order:
/// 1. If either side does not parse as a URI reference, the raw strings must
///    be equal.
/// 2. If `expected` has no scheme and no host, only the request URIs (path and
///    query) are compared. An expected value written without its leading
///    slash is tolerated: `"/login"` matches `"login"`.
/// 3. Otherwise both sides must be equal absolute URLs.
///
/// Callers skip this check entirely when no location is expected.
pub fn locations_match(actual: &str, expected: &str) -> bool {
    let (Some(parsed_actual), Some(parsed_expected)) =
        (ParsedLocation::parse(actual), ParsedLocation::parse(expected))
    else {
        return actual == expected;
    };

    match (&parsed_actual, &parsed_expected) {
        (
            _,
            ParsedLocation::Reference {
                has_host: false,
                request_uri: expected_uri,
            },
        ) => {
            let actual_uri = parsed_actual.request_uri();
            actual_uri == *expected_uri
                || format!("/{expected_uri}") == actual_uri
                || actual_uri.strip_prefix('/').unwrap_or(&actual_uri) == expected_uri.as_str()
        }
        (ParsedLocation::Absolute(a), ParsedLocation::Absolute(e)) => a == e,
        _ => actual == expected,
    }
}

/// First-occurrence substring search over a response body.
///
/// Returns `(true, span)` where `span` is the matched occurrence, or
/// `(false, actual)` with the whole body when `expected` is absent. An empty
/// `expected` always matches with an empty span.
pub fn match_content(actual: &str, expected: &str) -> (bool, String) {
    match actual.find(expected) {
        Some(index) => (true, actual[index..index + expected.len()].to_string()),
        None => (false, actual.to_string()),
    }
}

/// Exact comparison of a `Content-Security-Policy` header.
///
/// No normalization: directive order and whitespace matter. An empty
/// `expected` means no CSP requirement.
pub fn match_csp(actual: &str, expected: &str) -> bool {
    expected.is_empty() || actual == expected
}
