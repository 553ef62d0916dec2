//! LLM (`OpenAI` Chat Completions) client module
//!
//! Sends the session history plus the weather tool definition and returns
//! either a final message or the tool calls the model requested.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;

use super::prompt::{build_chat_messages, build_prompt};
use super::tools::weather_tool_definition;
use crate::core::history::{ToolRequest, Turn};
use crate::errors::BotError;

/// One step of model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutput {
    pub text: String,
    pub tool_requests: Vec<ToolRequest>,
}

impl ModelOutput {
    #[must_use]
    pub fn wants_tools(&self) -> bool {
        !self.tool_requests.is_empty()
    }

    #[must_use]
    pub fn into_turn(self) -> Turn {
        Turn::Assistant {
            text: self.text,
            tool_requests: self.tool_requests,
        }
    }
}

/// The "reason" step of the decision loop.
#[async_trait]
pub trait ReasoningModel: Send + Sync {
    /// Consumes the full history of a session and produces the next step.
    async fn reason(&self, history: &[Turn]) -> Result<ModelOutput, BotError>;
}

/// LLM API client for the weather assistant
pub struct LlmClient {
    http: Client,
    api_key: String,
    org_id: Option<String>,
    model_name: String,
    base_url: String,
}

impl LlmClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_key: String,
        org_id: Option<String>,
        model_name: String,
        base_url: String,
    ) -> Result<Self, BotError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| BotError::HttpError(format!("Failed to build LLM HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            org_id,
            model_name,
            base_url,
        })
    }

    fn headers(&self) -> Result<reqwest::header::HeaderMap, BotError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = format!("Bearer {}", self.api_key)
            .parse()
            .map_err(|e| BotError::HttpError(format!("Invalid Authorization header: {e}")))?;
        headers.insert("Authorization", auth_value);

        if let Some(org) = &self.org_id {
            let org_value = org.parse().map_err(|e| {
                BotError::HttpError(format!("Invalid OpenAI-Organization header: {e}"))
            })?;
            headers.insert("OpenAI-Organization", org_value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl ReasoningModel for LlmClient {
    async fn reason(&self, history: &[Turn]) -> Result<ModelOutput, BotError> {
        let prompt = build_prompt(history);

        #[cfg(feature = "debug-logs")]
        info!("Using LLM prompt:\n{:?}", prompt);

        #[cfg(not(feature = "debug-logs"))]
        info!("Reasoning over {} messages", prompt.len());

        let request_body = json!({
            "model": self.model_name,
            "messages": build_chat_messages(&prompt),
            "tools": [weather_tool_definition()],
            "tool_choice": "auto",
        });

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .headers(self.headers()?)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BotError::HttpError(format!("LLM API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(BotError::LlmError(format!(
                "LLM API error (status {status}): {error_text}"
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| BotError::LlmError(format!("Failed to parse LLM response: {e}")))?;

        parse_model_output(&response_json)
    }
}

/// Extracts text and tool calls from a Chat Completions response body.
pub(crate) fn parse_model_output(response_json: &Value) -> Result<ModelOutput, BotError> {
    let message = response_json
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| BotError::LlmError("LLM response contained no choices".to_string()))?;

    let text = message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let tool_requests = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| {
            calls
                .iter()
                .filter_map(|call| {
                    let id = call.get("id").and_then(Value::as_str)?;
                    let function = call.get("function")?;
                    let name = function.get("name").and_then(Value::as_str)?;
                    let arguments = function
                        .get("arguments")
                        .and_then(Value::as_str)
                        .unwrap_or("{}");
                    Some(ToolRequest {
                        id: id.to_string(),
                        name: name.to_string(),
                        arguments: arguments.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(ModelOutput {
        text,
        tool_requests,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_message() {
        let body = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "It is sunny."},
                "finish_reason": "stop"
            }]
        });
        let output = parse_model_output(&body).unwrap();
        assert_eq!(output.text, "It is sunny.");
        assert!(!output.wants_tools());
    }

    #[test]
    fn test_parse_tool_calls_with_null_content() {
        let body = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "weather_tool", "arguments": "{\"city\":\"Oslo\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let output = parse_model_output(&body).unwrap();
        assert!(output.text.is_empty());
        assert_eq!(
            output.tool_requests,
            vec![ToolRequest {
                id: "call_abc".to_string(),
                name: "weather_tool".to_string(),
                arguments: "{\"city\":\"Oslo\"}".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_without_choices_is_error() {
        assert!(matches!(
            parse_model_output(&json!({"choices": []})),
            Err(BotError::LlmError(_))
        ));
    }
}
