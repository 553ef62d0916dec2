//! Per-thread conversation history.
//!
//! The LLM backend replays the stored turns of a session on every new message
//! so follow-up questions in the same Slack thread keep their context. The
//! store is a trait so a persistent implementation can replace the in-memory
//! one without touching the event handling code.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::session::SessionKey;
use crate::errors::BotError;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments as produced by the model.
    pub arguments: String,
}

/// One role-tagged entry of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    Human {
        text: String,
    },
    Assistant {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_requests: Vec<ToolRequest>,
    },
    ToolResult {
        call_id: String,
        content: String,
    },
}

impl Turn {
    #[must_use]
    pub fn human(text: impl Into<String>) -> Self {
        Self::Human { text: text.into() }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            text: text.into(),
            tool_requests: Vec::new(),
        }
    }
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Returns the turns recorded for `key`, oldest first.
    async fn get(&self, key: &SessionKey) -> Result<Vec<Turn>, BotError>;

    /// Appends `turns` after the existing history of `key`.
    async fn append(&self, key: &SessionKey, turns: Vec<Turn>) -> Result<(), BotError>;
}

/// Process-local history. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    threads: Mutex<HashMap<SessionKey, Vec<Turn>>>,
}

impl InMemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn get(&self, key: &SessionKey) -> Result<Vec<Turn>, BotError> {
        Ok(self
            .threads
            .lock()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, key: &SessionKey, turns: Vec<Turn>) -> Result<(), BotError> {
        self.threads
            .lock()
            .await
            .entry(key.clone())
            .or_default()
            .extend(turns);
        Ok(())
    }
}
