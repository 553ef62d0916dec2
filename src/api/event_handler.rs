//! Handler for Slack Events API callbacks.
//!
//! Each `message` event is correlated to its thread through a session key,
//! answered by the configured backend, and the answer is posted back into the
//! same thread. Events are handled once, in arrival order, with no retries.

use std::sync::Arc;

use serde_json::Value;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use super::helpers::{ok_challenge, ok_empty};
use crate::backend::Backend;
use crate::core::models::{Answer, InboundMessage};
use crate::errors::BotError;
use crate::slack::{ReplySink, parse_message_event};

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// A reply was posted to the thread.
    Replied,
    /// The message was forwarded; nothing was posted by this process.
    Forwarded,
}

pub struct MessageEventHandler {
    backend: Arc<dyn Backend>,
    replies: Arc<dyn ReplySink>,
}

impl MessageEventHandler {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, replies: Arc<dyn ReplySink>) -> Self {
        Self { backend, replies }
    }

    /// Answers one message and delivers the answer to its thread.
    ///
    /// # Errors
    ///
    /// Returns an error only if posting the reply to Slack fails.
    pub async fn handle(&self, message: &InboundMessage) -> Result<HandleOutcome, BotError> {
        let session = message.session_key();
        let thread_ts = message.thread_anchor();
        let span = info_span!(
            "message",
            correlation_id = %Uuid::new_v4(),
            channel = %message.channel,
            session_key = %session,
        );

        async {
            info!("Handling message");

            match self.backend.answer(message, &session).await {
                Answer::Reply(text) => {
                    self.replies
                        .post_reply(&message.channel, thread_ts, &text)
                        .await?;
                    Ok(HandleOutcome::Replied)
                }
                Answer::Forwarded => Ok(HandleOutcome::Forwarded),
            }
        }
        .instrument(span)
        .await
    }
}

/// Handle an `event_callback` (or `url_verification`) payload from Slack.
///
/// Always returns a 200 response once the payload shape is understood so
/// Slack does not redeliver the event.
pub async fn handle_event_callback(handler: &MessageEventHandler, json_body: &Value) -> Value {
    let body_type = json_body.get("type").and_then(Value::as_str).unwrap_or("");

    if body_type == "url_verification" {
        let challenge = json_body
            .get("challenge")
            .and_then(Value::as_str)
            .unwrap_or("");
        return ok_challenge(challenge);
    }

    if body_type != "event_callback" {
        return ok_empty();
    }

    let Some(event) = json_body.get("event") else {
        return ok_empty();
    };

    let event_type = event.get("type").and_then(Value::as_str).unwrap_or("");
    info!(event_type = %event_type, "Processing event callback");

    if event_type != "message" {
        return ok_empty();
    }

    let Some(message) = parse_message_event(event) else {
        return ok_empty();
    };

    if let Err(e) = handler.handle(&message).await {
        error!(channel = %message.channel, "Failed to deliver reply: {}", e);
    }

    ok_empty()
}
