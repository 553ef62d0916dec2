use serde::{Deserialize, Serialize};

use super::session::{SessionKey, derive_session_key, thread_anchor};

/// A user message received from Slack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub text: String,
    pub channel: String,
    pub thread_ts: Option<String>,
    pub ts: String,
}

impl InboundMessage {
    /// Timestamp of the thread the reply belongs in.
    #[must_use]
    pub fn thread_anchor(&self) -> &str {
        thread_anchor(self.thread_ts.as_deref(), &self.ts)
    }

    #[must_use]
    pub fn session_key(&self) -> SessionKey {
        derive_session_key(&self.channel, self.thread_ts.as_deref(), &self.ts)
    }
}

/// What a backend produced for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Text to post back into the originating thread. Failures are rendered
    /// into this text as well so the user always receives a reply.
    Reply(String),
    /// The message was handed to a downstream system which replies on its own.
    Forwarded,
}
