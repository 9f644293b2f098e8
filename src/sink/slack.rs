//! Slack notification sink.
//!
//! Uses the Slack Web API directly: `chat.postMessage` to report and
//! `auth.test` to validate the token.

use chrono::Local;
use log::{error, info};
use serde::{Deserialize, Serialize};

use super::Sink;
use crate::check::CheckVerdict;
use crate::error_handling::DispatchError;

/// Response envelope shared by Slack Web API methods.
#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

/// Posts one message per failing verdict to a Slack channel.
pub struct SlackSink {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
    channel: Option<String>,
    validate_credentials: bool,
}

impl SlackSink {
    /// Creates a sink for `channel`, authenticated with `token`.
    pub fn new(
        client: reqwest::Client,
        api_url: &str,
        token: Option<String>,
        channel: Option<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            channel,
            validate_credentials: false,
        }
    }

    /// Calls `auth.test` before the first message of a dispatch.
    pub fn with_credential_check(mut self, enabled: bool) -> Self {
        self.validate_credentials = enabled;
        self
    }

    /// Whether both the token and the channel are set.
    pub fn is_configured(&self) -> bool {
        self.token.is_some() && self.channel.is_some()
    }

    fn token(&self) -> Result<&str, DispatchError> {
        self.token
            .as_deref()
            .ok_or(DispatchError::MissingSetting("SLACK_TOKEN"))
    }

    /// Checks the token with `auth.test`.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::SlackApi` if Slack rejects the token.
    pub async fn validate_credentials(&self) -> Result<(), DispatchError> {
        let resp = self
            .client
            .post(format!("{}/auth.test", self.api_url))
            .bearer_auth(self.token()?)
            .send()
            .await
            .map_err(|source| DispatchError::Http {
                target: "slack auth.test",
                source,
            })?;
        check_response(resp, "slack auth.test").await
    }

    /// Posts `text` to `channel`.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Http` if Slack is unreachable and
    /// `DispatchError::SlackApi` if it refuses the message.
    pub async fn post_message(&self, text: &str, channel: &str) -> Result<(), DispatchError> {
        let resp = self
            .client
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(self.token()?)
            .json(&PostMessage { channel, text })
            .send()
            .await
            .map_err(|source| DispatchError::Http {
                target: "slack chat.postMessage",
                source,
            })?;
        check_response(resp, "slack chat.postMessage")
            .await
            .inspect_err(|e| error!("Error posting message to Slack: {}", e))
    }
}

async fn check_response(resp: reqwest::Response, target: &'static str) -> Result<(), DispatchError> {
    let body: SlackResponse = resp
        .json()
        .await
        .map_err(|source| DispatchError::Http { target, source })?;
    if body.ok {
        Ok(())
    } else {
        Err(DispatchError::SlackApi(
            body.error.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

impl Sink for SlackSink {
    async fn dispatch(&self, failures: &[CheckVerdict]) -> Result<(), DispatchError> {
        let channel = self
            .channel
            .as_deref()
            .ok_or(DispatchError::MissingSetting("SLACK_CHANNEL_ID"))?;

        if self.validate_credentials {
            self.validate_credentials().await?;
        }

        for verdict in failures {
            info!(
                "Test result for {} generated on {}",
                verdict.application.name,
                Local::now().to_rfc2822()
            );
            self.post_message(verdict.message(), channel).await?;
        }
        info!("Posted {} failing check(s) to Slack", failures.len());
        Ok(())
    }
}
