//! HTTP probes.
//!
//! Two requests at most per application:
//! - a status probe (`HEAD`, redirects not followed) that observes the
//!   immediate response of the declared URL;
//! - a content probe (`GET`, redirects followed by hand up to
//!   `MAX_REDIRECT_HOPS`) that reads the body of the final landing page, only
//!   when content is expected.
//!
//! The shared client must have redirects disabled (see
//! `initialization::init_probe_client`); the redirect chain is walked here so
//! the hop cap does not depend on a client callback.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Response, Url};

use crate::check::application::Application;
use crate::check::verdict::CheckVerdict;
use crate::config::{ReportOptions, HEADER_CONTENT_SECURITY_POLICY, MAX_REDIRECT_HOPS};
use crate::error_handling::ProbeError;

/// What the status probe saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusObservation {
    /// Status code of the immediate response
    pub status_code: u16,
    /// `Location` header, empty if absent
    pub location: String,
    /// `Content-Security-Policy` header, empty if absent
    pub csp: String,
}

/// What the content probe saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentObservation {
    /// No content was expected, so no content probe was made.
    NotRequired,
    /// The final landing page after following redirects.
    Fetched {
        /// Status of the final response
        status_code: u16,
        /// URL of the final response
        final_url: String,
        /// Full response body
        body: String,
    },
}

/// Everything observed for one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeObservation {
    /// Status probe result
    pub status: StatusObservation,
    /// Content probe result
    pub content: ContentObservation,
}

/// Produces a verdict for one application.
///
/// The run orchestrator only depends on this trait, so tests can substitute a
/// deterministic probe for the network.
pub trait Probe {
    /// Probes `application` and assembles its verdict. Never fails: transport
    /// errors become failed verdicts.
    fn check(&self, application: &Application) -> impl Future<Output = CheckVerdict> + Send;
}

/// Probe that talks to the real application over HTTP.
#[derive(Clone)]
pub struct HttpProbe {
    client: Arc<reqwest::Client>,
    options: ReportOptions,
}

impl HttpProbe {
    /// Creates a probe around a client with redirects disabled.
    pub fn new(client: Arc<reqwest::Client>, options: ReportOptions) -> Self {
        Self { client, options }
    }

    /// Runs the status probe and, if content is expected, the content probe.
    ///
    /// # Errors
    ///
    /// Returns the first transport error; the content probe is not attempted
    /// if the status probe fails.
    pub async fn observe(&self, application: &Application) -> Result<ProbeObservation, ProbeError> {
        let status = self.status_probe(application).await?;

        let content = if application.needs_content_probe() {
            if self.options.debug {
                info!("[GET start] url={}", application.url);
            }
            let content = fetch_following_redirects(
                &self.client,
                &application.url,
                application.timeout(),
                MAX_REDIRECT_HOPS,
                self.options.debug,
            )
            .await
            .inspect_err(|e| {
                if self.options.debug {
                    info!("[GET error] url={} error={}", application.url, e);
                }
            })?;
            if self.options.debug {
                if let ContentObservation::Fetched {
                    status_code,
                    final_url,
                    body,
                } = &content
                {
                    info!(
                        "[GET final] status={} url={} bodyLen={}",
                        status_code,
                        final_url,
                        body.len()
                    );
                }
            }
            content
        } else {
            ContentObservation::NotRequired
        };

        Ok(ProbeObservation { status, content })
    }

    async fn status_probe(&self, application: &Application) -> Result<StatusObservation, ProbeError> {
        let resp = self
            .client
            .head(&application.url)
            .timeout(application.timeout())
            .send()
            .await?;

        let observation = StatusObservation {
            status_code: resp.status().as_u16(),
            location: header_value(resp.headers(), LOCATION.as_str()),
            csp: header_value(resp.headers(), HEADER_CONTENT_SECURITY_POLICY),
        };
        drain(resp).await;

        if self.options.debug {
            info!(
                "[HEAD probe] url={} status={} location={:?}",
                application.url, observation.status_code, observation.location
            );
        }
        Ok(observation)
    }
}

impl Probe for HttpProbe {
    async fn check(&self, application: &Application) -> CheckVerdict {
        let outcome = self.observe(application).await;
        CheckVerdict::assemble(application, outcome, &self.options)
    }
}

/// Fetches `start_url` with `GET`, following up to `max_hops` redirects.
///
/// `timeout` bounds the whole chain, body of the final page included.
/// Relative `Location` values are resolved against the URL that returned
/// them. A redirect status without a `Location` header is treated as the
/// final response. Every intermediate body is drained before the next hop.
///
/// # Errors
///
/// Returns `ProbeError::Timeout` when the chain does not complete in time,
/// `ProbeError::TooManyRedirects` when redirect number `max_hops + 1` is
/// reached, `ProbeError::InvalidRedirect` when a `Location` cannot be
/// resolved, and `ProbeError::Request` for transport failures.
pub async fn fetch_following_redirects(
    client: &reqwest::Client,
    start_url: &str,
    timeout: Duration,
    max_hops: usize,
    debug: bool,
) -> Result<ContentObservation, ProbeError> {
    tokio::time::timeout(timeout, follow_redirects(client, start_url, max_hops, debug))
        .await
        .map_err(|_| ProbeError::Timeout(timeout))?
}

async fn follow_redirects(
    client: &reqwest::Client,
    start_url: &str,
    max_hops: usize,
    debug: bool,
) -> Result<ContentObservation, ProbeError> {
    let mut current = start_url.to_string();
    let mut hops = 0usize;

    loop {
        let resp = client.get(&current).send().await?;
        let status_code = resp.status().as_u16();
        let location = header_value(resp.headers(), LOCATION.as_str());

        if is_followed_redirect(status_code) && !location.is_empty() {
            drain(resp).await;
            if hops >= max_hops {
                return Err(ProbeError::TooManyRedirects(hops));
            }
            let next = resolve_location(&current, &location)?;
            hops += 1;
            if debug {
                info!("[GET redirect] hop={} {} -> {}", hops, current, next);
            }
            current = next;
            continue;
        }

        let final_url = resp.url().to_string();
        let body = resp.text().await?;
        return Ok(ContentObservation::Fetched {
            status_code,
            final_url,
            body,
        });
    }
}

fn is_followed_redirect(status_code: u16) -> bool {
    matches!(status_code, 301 | 302 | 303 | 307 | 308)
}

fn resolve_location(current: &str, location: &str) -> Result<String, ProbeError> {
    Url::parse(location)
        .or_else(|_| Url::parse(current).and_then(|base| base.join(location)))
        .map(|url| url.to_string())
        .map_err(|_| ProbeError::InvalidRedirect {
            from: current.to_string(),
            location: location.to_string(),
        })
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Reads the rest of a response body so the connection can be reused.
async fn drain(resp: Response) {
    if let Err(e) = resp.bytes().await {
        debug!("Error draining response body: {}", e);
    }
}
