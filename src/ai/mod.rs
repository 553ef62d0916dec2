//! All AI/LLM functionality

pub mod client;
pub mod graph;
pub mod prompt;
pub mod tools;

// Re-export main types for convenience
pub use client::{LlmClient, ModelOutput, ReasoningModel};
pub use graph::{LoopOutcome, WeatherGraph};
