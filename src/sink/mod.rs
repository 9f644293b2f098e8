//! Reporting sinks for failing verdicts.
//!
//! A run reports to exactly one sink, chosen once from configuration:
//! - `SlackSink`: one chat message per failing verdict
//! - `MetricsSink`: a failure counter per application, pushed once to a
//!   Prometheus aggregation gateway
//!
//! New sinks implement `Sink` and get a `ReportSink` variant; the run
//! orchestrator does not change.

mod metrics;
mod slack;

use std::future::Future;

use log::warn;

pub use metrics::{FailureCounter, MetricsSink};
pub use slack::SlackSink;

use crate::check::CheckVerdict;
use crate::config::Config;
use crate::error_handling::DispatchError;

/// Destination for failing verdicts.
pub trait Sink {
    /// Called once per failing verdict while the run is still evaluating.
    fn record_failure(&self, _verdict: &CheckVerdict) {}

    /// Reports the failing verdicts of a run, in evaluation order.
    ///
    /// Only called when at least one verdict failed.
    fn dispatch(
        &self,
        failures: &[CheckVerdict],
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;
}

/// The sink selected for a run.
pub enum ReportSink {
    /// Post each failure to Slack
    Slack(SlackSink),
    /// Push failure counters to the aggregation gateway
    Metrics(MetricsSink),
}

impl ReportSink {
    /// Selects the sink from `config.output_slack`.
    ///
    /// Missing settings for the selected sink are logged here and reported as
    /// a `DispatchError` only if there is something to dispatch.
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        if config.output_slack {
            let sink = SlackSink::new(
                client,
                &config.slack_api_url,
                non_empty(config.slack_token.as_deref()),
                non_empty(config.slack_channel.as_deref()),
            )
            .with_credential_check(config.validate_slack_credentials);
            if !sink.is_configured() {
                warn!("SLACK_TOKEN or SLACK_CHANNEL_ID is not set");
            }
            ReportSink::Slack(sink)
        } else {
            let gateway = non_empty(config.prom_aggregation_gateway_url.as_deref());
            if gateway.is_none() {
                warn!("PROM_AGGREGATION_GATEWAY_URL is not set");
            }
            ReportSink::Metrics(MetricsSink::new(
                client,
                gateway,
                &config.metrics_job,
                &config.environment,
            ))
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ReportSink::Slack(_) => "slack",
            ReportSink::Metrics(_) => "metrics",
        }
    }
}

impl Sink for ReportSink {
    fn record_failure(&self, verdict: &CheckVerdict) {
        match self {
            ReportSink::Slack(sink) => sink.record_failure(verdict),
            ReportSink::Metrics(sink) => sink.record_failure(verdict),
        }
    }

    async fn dispatch(&self, failures: &[CheckVerdict]) -> Result<(), DispatchError> {
        match self {
            ReportSink::Slack(sink) => sink.dispatch(failures).await,
            ReportSink::Metrics(sink) => sink.dispatch(failures).await,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
