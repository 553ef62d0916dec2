//! Weather action for a Bedrock agent action group.
//!
//! The agent calls this Lambda with the parameters it extracted from the
//! conversation and expects a function-response envelope back. Failures are
//! reported inside the envelope with `responseState: "FAILURE"`; the Lambda
//! invocation itself always succeeds.

use lambda_runtime::{Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::BotError;
use crate::weather::WeatherClient;

pub const MESSAGE_VERSION: &str = "1.0";
pub const DEFAULT_ACTION_GROUP: &str = "get-weather-from-lambda";
pub const DEFAULT_FUNCTION: &str = "get-weather-data";
pub const WEATHER_INTENT: &str = "get_weather";
pub const INVALID_PARAMETERS: &str = "Invalid request parameters";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupEvent {
    #[serde(default)]
    pub message_version: Option<String>,
    #[serde(default)]
    pub action_group: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ActionParameter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionParameter {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: String,
}

impl ActionGroupEvent {
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResponseState {
    #[serde(rename = "FAILURE")]
    Failure,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseBody {
    #[serde(rename = "TEXT")]
    pub text: TextBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub response_body: ResponseBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_state: Option<ResponseState>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub action_group: String,
    pub function: String,
    pub function_response: FunctionResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupResponse {
    pub message_version: String,
    pub response: ActionResponse,
}

impl ActionGroupResponse {
    fn build(event: &ActionGroupEvent, body: String, state: Option<ResponseState>) -> Self {
        Self {
            message_version: MESSAGE_VERSION.to_string(),
            response: ActionResponse {
                action_group: event
                    .action_group
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ACTION_GROUP.to_string()),
                function: event
                    .function
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FUNCTION.to_string()),
                function_response: FunctionResponse {
                    response_body: ResponseBody {
                        text: TextBody { body },
                    },
                    response_state: state,
                },
            },
        }
    }

    #[must_use]
    pub fn success(event: &ActionGroupEvent, body: String) -> Self {
        Self::build(event, body, None)
    }

    #[must_use]
    pub fn failure(event: &ActionGroupEvent, body: String) -> Self {
        Self::build(event, body, Some(ResponseState::Failure))
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.response.function_response.response_state.is_some()
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.response.function_response.response_body.text.body
    }
}

fn validated_location(event: &ActionGroupEvent) -> Result<&str, BotError> {
    let location = event
        .parameter("location")
        .map(str::trim)
        .filter(|l| !l.is_empty());
    match (location, event.parameter("intent")) {
        (Some(location), Some(WEATHER_INTENT)) => Ok(location),
        _ => Err(BotError::ParseError(INVALID_PARAMETERS.to_string())),
    }
}

/// Answers one action-group request.
pub async fn handle_action(weather: &WeatherClient, event: &ActionGroupEvent) -> ActionGroupResponse {
    let Ok(location) = validated_location(event) else {
        return ActionGroupResponse::failure(event, INVALID_PARAMETERS.to_string());
    };

    match weather.fetch(location).await {
        Ok(snapshot) => ActionGroupResponse::success(event, snapshot.report(location)),
        Err(e) => {
            error!(location = %location, "Weather action failed: {}", e);
            ActionGroupResponse::failure(event, e.to_string())
        }
    }
}

/// Lambda handler for the weather action.
///
/// # Errors
///
/// Never fails; every problem is reported in the response envelope.
pub async fn function_handler(
    weather: &WeatherClient,
    event: LambdaEvent<ActionGroupEvent>,
) -> Result<ActionGroupResponse, Error> {
    info!(
        action_group = ?event.payload.action_group,
        function = ?event.payload.function,
        parameters = ?event.payload.parameters,
        "Received action event"
    );

    let response = handle_action(weather, &event.payload).await;

    info!(
        failure = response.is_failure(),
        body = %response.body(),
        "Action response"
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(params: serde_json::Value) -> ActionGroupEvent {
        serde_json::from_value(json!({ "parameters": params })).unwrap()
    }

    #[test]
    fn test_validation_requires_location_and_intent() {
        assert!(validated_location(&event(json!([
            {"name": "location", "type": "string", "value": "Tokyo"},
            {"name": "intent", "type": "string", "value": "get_weather"}
        ])))
        .is_ok());
        assert!(validated_location(&event(json!([
            {"name": "intent", "value": "get_weather"}
        ])))
        .is_err());
        assert!(validated_location(&event(json!([
            {"name": "location", "value": "Tokyo"},
            {"name": "intent", "value": "get_forecast"}
        ])))
        .is_err());
    }

    #[test]
    fn test_failure_envelope_shape() {
        let ev = event(json!([]));
        let value = serde_json::to_value(ActionGroupResponse::failure(&ev, "nope".into())).unwrap();
        assert_eq!(value["messageVersion"], "1.0");
        assert_eq!(value["response"]["actionGroup"], DEFAULT_ACTION_GROUP);
        assert_eq!(value["response"]["function"], DEFAULT_FUNCTION);
        assert_eq!(
            value["response"]["functionResponse"]["responseBody"]["TEXT"]["body"],
            "nope"
        );
        assert_eq!(value["response"]["functionResponse"]["responseState"], "FAILURE");
    }

    #[test]
    fn test_success_envelope_omits_state_and_echoes_names() {
        let ev: ActionGroupEvent = serde_json::from_value(json!({
            "messageVersion": "1.0",
            "actionGroup": "weather-group",
            "function": "lookup",
            "parameters": []
        }))
        .unwrap();
        let value = serde_json::to_value(ActionGroupResponse::success(&ev, "ok".into())).unwrap();
        assert_eq!(value["response"]["actionGroup"], "weather-group");
        assert_eq!(value["response"]["function"], "lookup");
        assert!(value["response"]["functionResponse"].get("responseState").is_none());
    }
}
