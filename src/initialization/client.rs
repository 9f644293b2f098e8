//! HTTP client initialization.
//!
//! This module provides functions to initialize HTTP clients with proper
//! configuration for probes and for the reporting sinks.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::error_handling::InitializationError;

/// Timeout for calls to Slack and the aggregation gateway.
const SINK_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Initializes the shared HTTP client used by the probes.
///
/// Creates a `reqwest::Client` with redirects disabled: the status probe must
/// see the immediate response, and the content probe walks the redirect chain
/// itself. Timeouts are set per request from each application's declaration.
///
/// # Arguments
///
/// * `user_agent` - User-Agent header sent with every probe
///
/// # Returns
///
/// A configured HTTP client with redirects disabled.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_probe_client(user_agent: &str) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(user_agent.to_string())
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes the HTTP client used by the reporting sinks.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_sink_client(user_agent: &str) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(SINK_REQUEST_TIMEOUT)
        .user_agent(user_agent.to_string())
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_probe_client_does_not_follow_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = init_probe_client("probe_test/1.0").expect("client");
        let resp = client
            .get(format!("{}/old", server.uri()))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status().as_u16(), 302);
    }

    #[tokio::test]
    async fn test_sink_client_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "sink_test/1.0"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = init_sink_client("sink_test/1.0").expect("client");
        let resp = client.get(server.uri()).send().await.expect("request");
        assert!(resp.status().is_success());
    }
}
