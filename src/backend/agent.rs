//! Managed Bedrock agent backend.

use async_trait::async_trait;
use aws_sdk_bedrockagentruntime::Client as AgentClient;
use aws_sdk_bedrockagentruntime::error::DisplayErrorContext;
use aws_sdk_bedrockagentruntime::types::ResponseStream;
use tracing::{error, info};

use super::{Backend, render_backend_error};
use crate::core::models::{Answer, InboundMessage};
use crate::core::provisioning::AgentIdentifiers;
use crate::core::session::SessionKey;
use crate::errors::BotError;

/// Concatenates streamed completion chunks in arrival order.
///
/// Chunks are raw bytes; a multi-byte UTF-8 sequence may be split across two
/// chunks, so an incomplete trailing sequence is held back until the next
/// chunk arrives.
#[derive(Debug, Default)]
pub struct ChunkAccumulator {
    text: String,
    pending: Vec<u8>,
}

impl ChunkAccumulator {
    /// # Errors
    ///
    /// Returns an error if the bytes are not valid UTF-8.
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), BotError> {
        self.pending.extend_from_slice(bytes);

        match std::str::from_utf8(&self.pending) {
            Ok(valid) => {
                self.text.push_str(valid);
                self.pending.clear();
            }
            Err(e) => {
                if e.error_len().is_some() {
                    return Err(BotError::AwsError(format!(
                        "agent returned invalid UTF-8: {e}"
                    )));
                }
                let valid_up_to = e.valid_up_to();
                let tail = self.pending.split_off(valid_up_to);
                let prefix = std::mem::replace(&mut self.pending, tail);
                // The prefix was validated by from_utf8 above.
                self.text.push_str(&String::from_utf8_lossy(&prefix));
            }
        }

        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the stream ended in the middle of a character.
    pub fn finish(self) -> Result<String, BotError> {
        if self.pending.is_empty() {
            Ok(self.text)
        } else {
            Err(BotError::AwsError(
                "agent stream ended inside a UTF-8 sequence".to_string(),
            ))
        }
    }
}

/// Invokes a remote agent and returns its full completion text.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn invoke(
        &self,
        ids: &AgentIdentifiers,
        session_id: &str,
        input_text: &str,
    ) -> Result<String, BotError>;
}

#[derive(Debug, Clone)]
pub struct BedrockAgentRuntime {
    client: AgentClient,
}

impl BedrockAgentRuntime {
    pub async fn from_env() -> Self {
        let shared = aws_config::from_env().load().await;
        Self {
            client: AgentClient::new(&shared),
        }
    }
}

#[async_trait]
impl AgentRuntime for BedrockAgentRuntime {
    async fn invoke(
        &self,
        ids: &AgentIdentifiers,
        session_id: &str,
        input_text: &str,
    ) -> Result<String, BotError> {
        let mut output = self
            .client
            .invoke_agent()
            .agent_id(&ids.agent_id)
            .agent_alias_id(&ids.agent_alias_id)
            .session_id(session_id)
            .input_text(input_text)
            .send()
            .await
            .map_err(|e| BotError::AwsError(format!("invoke_agent: {}", DisplayErrorContext(&e))))?;

        let mut chunks = ChunkAccumulator::default();
        while let Some(event) = output.completion.recv().await.map_err(|e| {
            BotError::AwsError(format!("agent completion stream: {}", DisplayErrorContext(&e)))
        })? {
            if let ResponseStream::Chunk(part) = event {
                if let Some(bytes) = part.bytes {
                    chunks.push(bytes.as_ref())?;
                }
            }
        }

        chunks.finish()
    }
}

pub struct ManagedAgentBackend<R> {
    runtime: R,
    ids: AgentIdentifiers,
}

impl<R: AgentRuntime> ManagedAgentBackend<R> {
    #[must_use]
    pub fn new(runtime: R, ids: AgentIdentifiers) -> Self {
        Self { runtime, ids }
    }
}

#[async_trait]
impl<R: AgentRuntime> Backend for ManagedAgentBackend<R> {
    async fn answer(&self, message: &InboundMessage, session: &SessionKey) -> Answer {
        info!(session_key = %session, agent_id = %self.ids.agent_id, "Invoking agent");

        let completion = match self
            .runtime
            .invoke(&self.ids, session.as_str(), &message.text)
            .await
        {
            Ok(text) if text.trim().is_empty() => Err(BotError::AwsError(
                "agent returned an empty completion".to_string(),
            )),
            other => other,
        };

        match completion {
            Ok(text) => Answer::Reply(text),
            Err(e) => {
                error!(session_key = %session, "Error invoking agent: {}", e);
                Answer::Reply(render_backend_error(&e))
            }
        }
    }
}
