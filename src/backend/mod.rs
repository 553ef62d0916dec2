//! Answer-providing backends.
//!
//! Every backend satisfies one contract: take the user's text and the thread's
//! session key, return an [`Answer`]. Failures never escape a backend; they
//! are rendered as a reply so the user always hears back.

pub mod agent;
pub mod graph;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::ai::{LlmClient, WeatherGraph};
use crate::core::config::{AppConfig, BackendKind};
use crate::core::history::InMemoryHistoryStore;
use crate::core::models::{Answer, InboundMessage};
use crate::core::provisioning::resolve_agent_identifiers;
use crate::core::session::SessionKey;
use crate::errors::BotError;
use crate::weather::WeatherClient;

pub use agent::{BedrockAgentRuntime, ManagedAgentBackend};
pub use graph::ToolAugmentedBackend;
pub use webhook::WebhookForwarder;

/// Prefix of every reply produced from a backend failure.
pub const BACKEND_ERROR_PREFIX: &str = "Error getting weather";

#[must_use]
pub fn render_backend_error(error: &BotError) -> String {
    format!("{BACKEND_ERROR_PREFIX}: {error}")
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn answer(&self, message: &InboundMessage, session: &SessionKey) -> Answer;
}

/// Builds the backend selected by `config.backend`.
///
/// # Errors
///
/// Fails when the selected backend is missing configuration (agent
/// identifiers, LLM key), so misconfiguration stops the process at startup.
pub async fn build_backend(config: &AppConfig) -> Result<Arc<dyn Backend>, BotError> {
    info!(backend = ?config.backend, "Building backend");

    match config.backend {
        BackendKind::Agent => {
            let ids = resolve_agent_identifiers(config).await?;
            let runtime = BedrockAgentRuntime::from_env().await;
            Ok(Arc::new(ManagedAgentBackend::new(runtime, ids)))
        }
        BackendKind::Llm => {
            let api_key = config.openai_api_key.clone().ok_or_else(|| {
                BotError::ConfigError("OPENAI_API_KEY is required for the llm backend".to_string())
            })?;
            let model = LlmClient::new(
                api_key,
                config.openai_org_id.clone(),
                config.openai_model.clone(),
                config.openai_base_url.clone(),
            )?;
            let weather = WeatherClient::new(&config.weather)?;
            let graph = WeatherGraph::new(
                Arc::new(model),
                Arc::new(weather),
                config.max_tool_round_trips,
            );
            Ok(Arc::new(ToolAugmentedBackend::new(
                graph,
                Arc::new(InMemoryHistoryStore::new()),
            )))
        }
        BackendKind::Webhook => Ok(Arc::new(WebhookForwarder::new(
            config.webhook_url.clone(),
            config.webhook_ack_timeout,
        )?)),
    }
}
