//! Extraction of user messages from Slack Events API payloads.

use serde_json::Value;
use tracing::debug;

use crate::core::models::InboundMessage;

/// Returns the user message carried by a `message` event, if any.
///
/// Bot messages and system/edited messages (anything with a `subtype`) are
/// skipped so the bot never answers its own replies.
#[must_use]
pub fn parse_message_event(event: &Value) -> Option<InboundMessage> {
    if event.get("bot_id").is_some() || event.get("subtype").is_some() {
        debug!("Ignoring bot or system message");
        return None;
    }

    let str_field = |name: &str| {
        event
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    };

    let channel = str_field("channel")?;
    let ts = str_field("ts")?;

    Some(InboundMessage {
        text: event
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        channel,
        thread_ts: str_field("thread_ts"),
        ts,
    })
}
