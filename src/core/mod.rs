//! Domain types shared by the Slack handler, the backends and the weather tool.

pub mod config;
pub mod history;
pub mod models;
pub mod provisioning;
pub mod session;

pub use history::{HistoryStore, InMemoryHistoryStore, Turn};
pub use models::{Answer, InboundMessage};
pub use session::{SessionKey, derive_session_key};
