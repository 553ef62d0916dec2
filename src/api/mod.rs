//! Slack Lambda handler and request processing

pub mod event_handler;
pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod signature;

// Re-export the main handler for convenience
pub use event_handler::{HandleOutcome, MessageEventHandler};
pub use handler::{BotApp, function_handler as handler};
