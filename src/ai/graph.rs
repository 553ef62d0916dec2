//! Two-node reason/act loop.
//!
//! ```text
//!          +--------+   tool requests   +-----+
//! start -> | reason | ----------------> | act |
//!          +--------+ <---------------- +-----+
//!               |        tool results
//!               | no tool requests
//!               v
//!             answer
//! ```
//!
//! The loop is bounded by `max_round_trips` act steps.

use std::sync::Arc;

use tracing::{info, warn};

use super::client::ReasoningModel;
use super::tools::{WEATHER_TOOL_NAME, parse_city_argument};
use crate::core::history::{ToolRequest, Turn};
use crate::errors::BotError;
use crate::weather::WeatherLookup;

enum Node {
    Reason,
    Act(Vec<ToolRequest>),
}

/// Result of one completed loop run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    /// Final natural-language answer.
    pub answer: String,
    /// Turns produced during the run, in order, ending with the answer.
    pub turns: Vec<Turn>,
}

pub struct WeatherGraph {
    model: Arc<dyn ReasoningModel>,
    weather: Arc<dyn WeatherLookup>,
    max_round_trips: usize,
}

impl WeatherGraph {
    #[must_use]
    pub fn new(
        model: Arc<dyn ReasoningModel>,
        weather: Arc<dyn WeatherLookup>,
        max_round_trips: usize,
    ) -> Self {
        Self {
            model,
            weather,
            max_round_trips,
        }
    }

    async fn act(&self, request: &ToolRequest) -> Turn {
        let content = if request.name == WEATHER_TOOL_NAME {
            match parse_city_argument(&request.arguments) {
                Ok(city) => {
                    info!(city = %city, "Running weather tool");
                    self.weather.lookup(&city).await
                }
                Err(e) => format!("Error: {e}"),
            }
        } else {
            warn!(tool = %request.name, "Model requested an unknown tool");
            format!("Error: unknown tool '{}'", request.name)
        };

        Turn::ToolResult {
            call_id: request.id.clone(),
            content,
        }
    }

    /// Runs the loop over `history`, whose last turn is the new user message.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails, the final answer is empty, or
    /// the model keeps requesting tools past the round-trip limit.
    pub async fn run(&self, history: &[Turn]) -> Result<LoopOutcome, BotError> {
        let mut conversation = history.to_vec();
        let mut produced = Vec::new();
        let mut round_trips = 0;
        let mut node = Node::Reason;

        loop {
            node = match node {
                Node::Reason => {
                    let output = self.model.reason(&conversation).await?;
                    if !output.wants_tools() {
                        if output.text.trim().is_empty() {
                            return Err(BotError::LlmError(
                                "model returned an empty answer".to_string(),
                            ));
                        }
                        let answer = output.text.clone();
                        produced.push(output.into_turn());
                        return Ok(LoopOutcome {
                            answer,
                            turns: produced,
                        });
                    }
                    let requests = output.tool_requests.clone();
                    let turn = output.into_turn();
                    conversation.push(turn.clone());
                    produced.push(turn);
                    Node::Act(requests)
                }
                Node::Act(requests) => {
                    round_trips += 1;
                    if round_trips > self.max_round_trips {
                        return Err(BotError::LlmError(format!(
                            "gave up after {} tool round trips without an answer",
                            self.max_round_trips
                        )));
                    }
                    for request in &requests {
                        let turn = self.act(request).await;
                        conversation.push(turn.clone());
                        produced.push(turn);
                    }
                    Node::Reason
                }
            };
        }
    }
}
