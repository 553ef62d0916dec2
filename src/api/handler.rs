//! Slack Lambda handler - thin router in front of the message event handler.
//!
//! This module handles:
//! - Request validation (headers, body, signature)
//! - Events API callbacks (delegated to `event_handler`)

use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use super::event_handler::{MessageEventHandler, handle_event_callback};
use super::{helpers, parsing, signature};
use crate::backend::{Backend, build_backend};
use crate::core::config::AppConfig;
use crate::errors::BotError;
use crate::slack::{ReplySink, SlackClient};

/// Long-lived state shared by every invocation of one Lambda execution
/// environment. The backend (and with it the thread history) lives here.
pub struct BotApp {
    signing_secret: String,
    events: MessageEventHandler,
}

impl BotApp {
    #[must_use]
    pub fn new(
        signing_secret: String,
        backend: Arc<dyn Backend>,
        replies: Arc<dyn ReplySink>,
    ) -> Self {
        Self {
            signing_secret,
            events: MessageEventHandler::new(backend, replies),
        }
    }

    /// Builds the configured backend and the Slack reply client.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be built; the process should not
    /// start serving in that case.
    pub async fn from_config(config: &AppConfig) -> Result<Self, BotError> {
        let backend = build_backend(config).await?;
        let replies = Arc::new(SlackClient::new(config.slack_bot_token.clone()));
        Ok(Self::new(config.slack_signing_secret.clone(), backend, replies))
    }

    #[must_use]
    pub fn events(&self) -> &MessageEventHandler {
        &self.events
    }
}

/// Lambda handler for the Slack entrypoint.
///
/// # Errors
///
/// Never fails for malformed requests; those get an error status in the
/// returned payload instead.
#[tracing::instrument(level = "info", skip(app, event))]
pub async fn function_handler(app: &BotApp, event: LambdaEvent<Value>) -> Result<Value, Error> {
    info!(request_id = %event.context.request_id, "Slack Lambda received request");
    let payload = event.payload;

    let Some(headers) = payload.get("headers") else {
        error!("Request missing headers");
        return Ok(helpers::err_response(400, "Missing headers"));
    };

    let body = match parsing::extract_body(&payload) {
        Ok(b) => b,
        Err(e) => {
            error!("{}", e);
            return Ok(helpers::err_response(400, &e.to_string()));
        }
    };

    if let Err(response) = verify_signature(&body, headers, &app.signing_secret) {
        return Ok(response);
    }

    info!("Slack signature verified successfully");

    // Redeliveries of an event already dispatched are acked without answering.
    if let Some(retry_num) = parsing::get_header_value(headers, "X-Slack-Retry-Num") {
        let reason = parsing::get_header_value(headers, "X-Slack-Retry-Reason").unwrap_or("unknown");
        info!(retry_num = %retry_num, retry_reason = %reason, "Ignoring Slack retry delivery");
        return Ok(helpers::ok_empty());
    }

    match serde_json::from_str::<Value>(&body) {
        Ok(json_body) => Ok(handle_event_callback(&app.events, &json_body).await),
        Err(e) => {
            error!("Events API body is not JSON: {}", e);
            Ok(helpers::err_response(400, &format!("Parse Error: {e}")))
        }
    }
}

fn verify_signature(body: &str, headers: &Value, signing_secret: &str) -> Result<(), Value> {
    let Some(sig) = parsing::get_header_value(headers, "X-Slack-Signature") else {
        error!("Missing X-Slack-Signature header");
        return Err(helpers::err_response(
            401,
            "Missing X-Slack-Signature header",
        ));
    };

    let Some(timestamp) = parsing::get_header_value(headers, "X-Slack-Request-Timestamp") else {
        error!("Missing X-Slack-Request-Timestamp header");
        return Err(helpers::err_response(
            401,
            "Missing X-Slack-Request-Timestamp header",
        ));
    };

    if !signature::verify_slack_signature(body, timestamp, sig, signing_secret) {
        error!("Slack signature verification failed");
        return Err(helpers::err_response(401, "Invalid Slack signature"));
    }

    Ok(())
}
