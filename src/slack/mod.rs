//! All Slack-specific functionality

pub mod client;
pub mod events;

// Re-export main types for convenience
pub use client::{ReplySink, SlackClient};
pub use events::parse_message_event;
