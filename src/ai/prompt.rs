//! Prompt assembly for the weather assistant.

use openai_api_rs::v1::chat_completion::{
    ChatCompletionMessage, Content, MessageRole, ToolCall, ToolCallFunction,
};
use serde_json::{Value, json};

use crate::core::history::Turn;

pub const SYSTEM_PROMPT: &str = "You are a helpful weather assistant that provides accurate weather \
information and suggests appropriate outdoor activities. Always use the weather_tool when users ask \
about weather conditions for specific locations, and answer in a short sentence.";

fn message(role: MessageRole, text: String) -> ChatCompletionMessage {
    ChatCompletionMessage {
        role,
        content: Content::Text(text),
        name: None,
        tool_calls: None,
        tool_call_id: None,
    }
}

/// Converts a session history into chat messages, led by the system prompt.
#[must_use]
pub fn build_prompt(history: &[Turn]) -> Vec<ChatCompletionMessage> {
    let mut chat = vec![message(MessageRole::system, SYSTEM_PROMPT.to_string())];

    chat.extend(history.iter().map(|turn| match turn {
        Turn::Human { text } => message(MessageRole::user, text.clone()),
        Turn::Assistant {
            text,
            tool_requests,
        } => {
            let mut msg = message(MessageRole::assistant, text.clone());
            if !tool_requests.is_empty() {
                msg.tool_calls = Some(
                    tool_requests
                        .iter()
                        .map(|req| ToolCall {
                            id: req.id.clone(),
                            r#type: "function".to_string(),
                            function: ToolCallFunction {
                                name: Some(req.name.clone()),
                                arguments: Some(req.arguments.clone()),
                            },
                        })
                        .collect(),
                );
            }
            msg
        }
        Turn::ToolResult { call_id, content } => {
            let mut msg = message(MessageRole::tool, content.clone());
            msg.tool_call_id = Some(call_id.clone());
            msg
        }
    }));

    chat
}

/// Builds the Chat Completions `messages` payload from a prompt.
/// - Assistant tool calls are emitted as `tool_calls` with `null` content when empty
/// - Tool results carry their `tool_call_id`
/// - Image parts are dropped; the assistant is text-only
#[must_use]
pub fn build_chat_messages(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .map(|m| {
            let role_str = match m.role {
                MessageRole::system => "system",
                MessageRole::user | MessageRole::function => "user",
                MessageRole::assistant => "assistant",
                MessageRole::tool => "tool",
            };

            let text = match &m.content {
                Content::Text(t) => t.clone(),
                Content::ImageUrl(_) => String::new(),
            };

            let text_is_empty = text.is_empty();
            let mut out = json!({ "role": role_str, "content": text });

            if let Some(calls) = m.tool_calls.as_ref().filter(|c| !c.is_empty()) {
                if text_is_empty {
                    out["content"] = Value::Null;
                }
                out["tool_calls"] = calls
                    .iter()
                    .map(|c| {
                        json!({
                            "id": c.id,
                            "type": "function",
                            "function": {
                                "name": c.function.name.clone().unwrap_or_default(),
                                "arguments": c.function.arguments.clone().unwrap_or_else(|| "{}".to_string()),
                            }
                        })
                    })
                    .collect();
            }

            if let Some(id) = &m.tool_call_id {
                out["tool_call_id"] = Value::String(id.clone());
            }

            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::ToolRequest;

    #[test]
    fn test_prompt_starts_with_system_and_keeps_order() {
        let history = vec![
            Turn::human("weather in Tokyo?"),
            Turn::Assistant {
                text: String::new(),
                tool_requests: vec![ToolRequest {
                    id: "call_1".to_string(),
                    name: "weather_tool".to_string(),
                    arguments: r#"{"city":"Tokyo"}"#.to_string(),
                }],
            },
            Turn::ToolResult {
                call_id: "call_1".to_string(),
                content: "Weather for Tokyo: ...".to_string(),
            },
            Turn::assistant("It is sunny in Tokyo."),
        ];

        let messages = build_chat_messages(&build_prompt(&history));

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "weather in Tokyo?");
        assert_eq!(messages[2]["role"], "assistant");
        assert!(messages[2]["content"].is_null());
        assert_eq!(messages[2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(
            messages[2]["tool_calls"][0]["function"]["arguments"],
            r#"{"city":"Tokyo"}"#
        );
        assert_eq!(messages[3]["role"], "tool");
        assert_eq!(messages[3]["tool_call_id"], "call_1");
        assert_eq!(messages[4]["content"], "It is sunny in Tokyo.");
        assert!(messages[4].get("tool_calls").is_none());
    }
}
