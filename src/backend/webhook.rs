//! Forwarding backend for an external automation webhook (e.g. n8n).
//!
//! The downstream workflow posts its own reply to Slack, so this backend has
//! no answer of its own.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};

use super::Backend;
use crate::core::models::{Answer, InboundMessage};
use crate::core::session::SessionKey;
use crate::errors::BotError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    pub text: String,
    pub channel: String,
    pub thread_ts: String,
}

impl From<&InboundMessage> for WebhookPayload {
    fn from(message: &InboundMessage) -> Self {
        Self {
            text: message.text.clone(),
            channel: message.channel.clone(),
            thread_ts: message.thread_anchor().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookForwarder {
    http: Client,
    url: String,
    ack_timeout: Duration,
}

impl WebhookForwarder {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: String, ack_timeout: Duration) -> Result<Self, BotError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BotError::HttpError(format!("Failed to build webhook HTTP client: {e}")))?;
        Ok(Self {
            http,
            url,
            ack_timeout,
        })
    }
}

#[async_trait]
impl Backend for WebhookForwarder {
    /// Fire-and-forget: the POST runs on a detached task and this call waits
    /// at most `ack_timeout` for it before returning.
    async fn answer(&self, message: &InboundMessage, session: &SessionKey) -> Answer {
        let payload = WebhookPayload::from(message);
        let http = self.http.clone();
        let url = self.url.clone();
        let session_key = session.to_string();

        info!(session_key = %session_key, url = %url, "Forwarding message to webhook");

        let handle = tokio::spawn(async move {
            match http.post(&url).json(&payload).send().await {
                Ok(resp) if !resp.status().is_success() => {
                    warn!(session_key = %session_key, status = %resp.status(), "Webhook rejected message");
                }
                Ok(_) => {}
                Err(e) => error!(session_key = %session_key, "Failed to forward to webhook: {}", e),
            }
        });

        if tokio::time::timeout(self.ack_timeout, handle).await.is_err() {
            warn!(
                session_key = %session,
                ack_timeout = ?self.ack_timeout,
                "Webhook POST still in flight after ack timeout; forward may be lost"
            );
        }

        Answer::Forwarded
    }
}
