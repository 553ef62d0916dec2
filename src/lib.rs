//! Weatherbot - Slack bots that answer weather questions in-thread.
//!
//! This crate implements two Lambda functions:
//! 1. A Slack Lambda that verifies Events API callbacks, derives a per-thread
//!    session key and hands each message to the configured backend
//! 2. A weather action Lambda that serves a Bedrock agent's action group
//!
//! # Backends
//!
//! The Slack Lambda delegates to exactly one backend, selected at startup:
//! - `agent`: a managed Bedrock agent that keeps its own per-session memory
//! - `llm`: an LLM reason/act loop with the Open-Meteo weather tool and a
//!   per-thread history store
//! - `webhook`: forwards the message to an automation webhook which replies
//!   on its own
//!
//! # Example
//!
//! ```no_run
//! use weatherbot::api::BotApp;
//! use weatherbot::core::config::AppConfig;
//! use weatherbot::core::models::InboundMessage;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     weatherbot::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let app = BotApp::from_config(&config).await?;
//!
//!     let message = InboundMessage {
//!         text: "weather in Tokyo?".to_string(),
//!         channel: "C12345678".to_string(),
//!         thread_ts: None,
//!         ts: "1718000000.000100".to_string(),
//!     };
//!     app.events().handle(&message).await?;
//!
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod action;
pub mod ai;
pub mod api;
pub mod backend;
pub mod core;
pub mod errors;
pub mod slack;
pub mod weather;

pub use errors::BotError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// The level comes from `RUST_LOG` and defaults to `info`. This function
/// should be called once at the start of each Lambda binary.
///
/// # Example
///
/// ```
/// weatherbot::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
