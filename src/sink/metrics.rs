//! Prometheus metrics sink.
//!
//! Failures are counted per application while the run evaluates, then pushed
//! once in Prometheus text exposition format to an aggregation gateway.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use log::{debug, info, warn};

use super::Sink;
use crate::check::CheckVerdict;
use crate::config::{FAILED_CHECKS_METRIC, FAILED_CHECKS_METRIC_HELP};
use crate::error_handling::DispatchError;

const PROMETHEUS_TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Failure counts keyed by application name.
///
/// Increments may come from concurrently evaluated checks.
#[derive(Debug, Default)]
pub struct FailureCounter {
    counts: Mutex<BTreeMap<String, u64>>,
}

impl FailureCounter {
    /// Creates an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one failure for `app`.
    pub fn increment(&self, app: &str) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        *counts.entry(app.to_string()).or_insert(0) += 1;
    }

    /// Current count for `app`, 0 if it never failed.
    pub fn get(&self, app: &str) -> u64 {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts.get(app).copied().unwrap_or(0)
    }

    /// True when nothing was counted.
    pub fn is_empty(&self) -> bool {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Renders the counts as a Prometheus counter family labeled by `app` and
    /// `env`, sorted by application name.
    pub fn render(&self, metric: &str, help: &str, environment: &str) -> String {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out = format!("# HELP {metric} {help}\n# TYPE {metric} counter\n");
        let env = escape_label_value(environment);
        for (app, count) in counts.iter() {
            out.push_str(&format!(
                "{metric}{{app=\"{}\",env=\"{env}\"}} {count}\n",
                escape_label_value(app)
            ));
        }
        out
    }
}

/// Escapes a label value for the text exposition format.
fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Counts failing applications and pushes the counts to an aggregation
/// gateway at dispatch.
pub struct MetricsSink {
    client: reqwest::Client,
    gateway_url: Option<String>,
    job: String,
    environment: String,
    counter: FailureCounter,
}

impl MetricsSink {
    /// Creates a sink pushing to `gateway_url` under `job`.
    pub fn new(
        client: reqwest::Client,
        gateway_url: Option<String>,
        job: &str,
        environment: &str,
    ) -> Self {
        Self {
            client,
            gateway_url,
            job: job.to_string(),
            environment: environment.to_string(),
            counter: FailureCounter::new(),
        }
    }

    /// The counter accumulated so far.
    pub fn counter(&self) -> &FailureCounter {
        &self.counter
    }

    /// Counts one failure for `app`.
    pub fn increment(&self, app: &str) {
        self.counter.increment(app);
    }

    /// Pushes the accumulated counts in a single request. Nothing is pushed
    /// while no failure has been counted.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::MissingSetting` without a gateway URL,
    /// `DispatchError::Http` on transport failure and
    /// `DispatchError::MetricsPush` on a non-2xx answer.
    pub async fn flush(&self) -> Result<(), DispatchError> {
        if self.counter.is_empty() {
            debug!("No failure counters to push");
            return Ok(());
        }
        let gateway = self
            .gateway_url
            .as_deref()
            .ok_or(DispatchError::MissingSetting("PROM_AGGREGATION_GATEWAY_URL"))?;
        let url = format!(
            "{}/metrics/job/{}",
            gateway.trim_end_matches('/'),
            self.job
        );
        let payload = self.counter.render(
            FAILED_CHECKS_METRIC,
            FAILED_CHECKS_METRIC_HELP,
            &self.environment,
        );

        let resp = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, PROMETHEUS_TEXT_CONTENT_TYPE)
            .body(payload)
            .send()
            .await
            .map_err(|source| DispatchError::Http {
                target: "metrics gateway",
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("Metrics push to {} failed with status {}", url, status);
            return Err(DispatchError::MetricsPush {
                status: status.as_u16(),
                body,
            });
        }
        info!("Pushed failure counters to {}", url);
        Ok(())
    }
}

impl Sink for MetricsSink {
    fn record_failure(&self, verdict: &CheckVerdict) {
        self.increment(&verdict.application.name);
    }

    async fn dispatch(&self, _failures: &[CheckVerdict]) -> Result<(), DispatchError> {
        self.flush().await
    }
}
