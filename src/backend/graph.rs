//! Tool-augmented LLM backend with per-thread memory.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use super::{Backend, render_backend_error};
use crate::ai::WeatherGraph;
use crate::core::history::{HistoryStore, Turn};
use crate::core::models::{Answer, InboundMessage};
use crate::core::session::SessionKey;
use crate::errors::BotError;

pub struct ToolAugmentedBackend {
    graph: WeatherGraph,
    history: Arc<dyn HistoryStore>,
}

impl ToolAugmentedBackend {
    #[must_use]
    pub fn new(graph: WeatherGraph, history: Arc<dyn HistoryStore>) -> Self {
        Self { graph, history }
    }

    async fn converse(&self, message: &InboundMessage, session: &SessionKey) -> Result<String, BotError> {
        let user_turn = Turn::human(message.text.clone());

        let mut conversation = self.history.get(session).await?;
        info!(session_key = %session, prior_turns = conversation.len(), "Replaying thread history");
        conversation.push(user_turn.clone());

        let outcome = self.graph.run(&conversation).await?;

        // Only completed exchanges are remembered; a failed run leaves the
        // thread history as it was.
        let mut new_turns = Vec::with_capacity(outcome.turns.len() + 1);
        new_turns.push(user_turn);
        new_turns.extend(outcome.turns);
        self.history.append(session, new_turns).await?;

        Ok(outcome.answer)
    }
}

#[async_trait]
impl Backend for ToolAugmentedBackend {
    async fn answer(&self, message: &InboundMessage, session: &SessionKey) -> Answer {
        match self.converse(message, session).await {
            Ok(text) => Answer::Reply(text),
            Err(e) => {
                error!(session_key = %session, "Error running weather graph: {}", e);
                Answer::Reply(render_backend_error(&e))
            }
        }
    }
}
