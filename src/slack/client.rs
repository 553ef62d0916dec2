//! Slack API client module
//!
//! Posts replies into the thread a question came from.

use async_trait::async_trait;
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::SlackApiChatPostMessageRequest;
use slack_morphism::{
    SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackMessageContent, SlackTs,
};
use tracing::{info, warn};

use crate::errors::BotError;

// A connector that fails to build is stored as None; posting then reports it.
static SLACK_CLIENT: std::sync::LazyLock<Option<SlackHyperClient>> =
    std::sync::LazyLock::new(|| match SlackClientHyperConnector::new() {
        Ok(connector) => Some(SlackHyperClient::new(connector)),
        Err(e) => {
            warn!("Failed to create Slack HTTP connector: {}", e);
            None
        }
    });

/// Destination for thread replies.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Posts `text` into `channel` under the thread rooted at `thread_ts`.
    async fn post_reply(&self, channel: &str, thread_ts: &str, text: &str) -> Result<(), BotError>;
}

/// Slack Web API client authenticated with the bot token
pub struct SlackClient {
    token: SlackApiToken,
}

impl SlackClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
        }
    }
}

#[async_trait]
impl ReplySink for SlackClient {
    /// # Errors
    ///
    /// Returns an error if the connector is unavailable or Slack rejects the post.
    async fn post_reply(&self, channel: &str, thread_ts: &str, text: &str) -> Result<(), BotError> {
        let session = SLACK_CLIENT
            .as_ref()
            .ok_or_else(|| BotError::GeneralError("Slack HTTP connector not initialized".to_string()))?
            .open_session(&self.token);

        let post_req = SlackApiChatPostMessageRequest::new(
            SlackChannelId(channel.to_string()),
            SlackMessageContent::new().with_text(text.to_string()),
        )
        .with_thread_ts(SlackTs::new(thread_ts.to_string()));

        session.chat_post_message(&post_req).await?;
        info!(channel = %channel, thread_ts = %thread_ts, "Posted reply");

        Ok(())
    }
}
