use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use weatherbot::ai::{ModelOutput, ReasoningModel, WeatherGraph};
use weatherbot::backend::{Backend, ToolAugmentedBackend};
use weatherbot::core::history::{HistoryStore, InMemoryHistoryStore, ToolRequest, Turn};
use weatherbot::core::models::{Answer, InboundMessage};
use weatherbot::errors::BotError;
use weatherbot::weather::WeatherLookup;

/// Model that plays back a fixed script and records every history it saw.
struct ScriptedModel {
    script: Mutex<VecDeque<Result<ModelOutput, BotError>>>,
    inputs: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedModel {
    fn new(script: Vec<Result<ModelOutput, BotError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            inputs: Mutex::new(Vec::new()),
        })
    }

    fn inputs(&self) -> Vec<Vec<Turn>> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningModel for ScriptedModel {
    async fn reason(&self, history: &[Turn]) -> Result<ModelOutput, BotError> {
        self.inputs.lock().unwrap().push(history.to_vec());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BotError::LlmError("script exhausted".to_string())))
    }
}

#[derive(Default)]
struct FakeWeather {
    cities: Mutex<Vec<String>>,
}

#[async_trait]
impl WeatherLookup for FakeWeather {
    async fn lookup(&self, city: &str) -> String {
        self.cities.lock().unwrap().push(city.to_string());
        format!("Weather for {city}:\nTemperature: 72.0°F\nConditions: Clear sky")
    }
}

fn say(text: &str) -> Result<ModelOutput, BotError> {
    Ok(ModelOutput {
        text: text.to_string(),
        tool_requests: Vec::new(),
    })
}

fn call_weather(id: &str, city: &str) -> Result<ModelOutput, BotError> {
    Ok(ModelOutput {
        text: String::new(),
        tool_requests: vec![ToolRequest {
            id: id.to_string(),
            name: "weather_tool".to_string(),
            arguments: format!(r#"{{"city":"{city}"}}"#),
        }],
    })
}

fn message(text: &str, thread_ts: Option<&str>, ts: &str) -> InboundMessage {
    InboundMessage {
        text: text.to_string(),
        channel: "C1".to_string(),
        thread_ts: thread_ts.map(ToString::to_string),
        ts: ts.to_string(),
    }
}

fn backend(
    model: Arc<ScriptedModel>,
    weather: Arc<FakeWeather>,
    history: Arc<InMemoryHistoryStore>,
    max_round_trips: usize,
) -> ToolAugmentedBackend {
    ToolAugmentedBackend::new(WeatherGraph::new(model, weather, max_round_trips), history)
}

#[tokio::test]
async fn test_tool_round_trip_produces_answer() {
    let model = ScriptedModel::new(vec![
        call_weather("call_1", "Tokyo"),
        say("It's 72°F and clear in Tokyo."),
    ]);
    let weather = Arc::new(FakeWeather::default());
    let history = Arc::new(InMemoryHistoryStore::new());
    let backend = backend(model.clone(), weather.clone(), history.clone(), 5);

    let msg = message("weather in Tokyo?", None, "100.1");
    let answer = backend.answer(&msg, &msg.session_key()).await;

    assert_eq!(answer, Answer::Reply("It's 72°F and clear in Tokyo.".to_string()));
    assert_eq!(*weather.cities.lock().unwrap(), vec!["Tokyo".to_string()]);

    // The second reasoning step sees the tool result for the first call.
    let inputs = model.inputs();
    assert_eq!(inputs.len(), 2);
    assert!(matches!(
        inputs[1].last(),
        Some(Turn::ToolResult { call_id, content }) if call_id == "call_1" && content.contains("Tokyo")
    ));

    let stored = history.get(&msg.session_key()).await.unwrap();
    assert_eq!(stored.len(), 4);
    assert_eq!(stored[0], Turn::human("weather in Tokyo?"));
    assert_eq!(stored[3], Turn::assistant("It's 72°F and clear in Tokyo."));
}

#[tokio::test]
async fn test_thread_follow_up_replays_prior_exchange() {
    let model = ScriptedModel::new(vec![say("Sunny in Paris."), say("Rain tomorrow in Paris.")]);
    let history = Arc::new(InMemoryHistoryStore::new());
    let backend = backend(model.clone(), Arc::new(FakeWeather::default()), history, 5);

    let first = message("weather in Paris?", None, "100.1");
    let follow_up = message("and tomorrow?", Some("100.1"), "100.5");
    assert_eq!(first.session_key(), follow_up.session_key());

    backend.answer(&first, &first.session_key()).await;
    backend.answer(&follow_up, &follow_up.session_key()).await;

    let inputs = model.inputs();
    assert_eq!(
        inputs[1],
        vec![
            Turn::human("weather in Paris?"),
            Turn::assistant("Sunny in Paris."),
            Turn::human("and tomorrow?"),
        ]
    );
}

#[tokio::test]
async fn test_other_threads_do_not_share_history() {
    let model = ScriptedModel::new(vec![say("Sunny in Paris."), say("Snow in Oslo.")]);
    let history = Arc::new(InMemoryHistoryStore::new());
    let backend = backend(model.clone(), Arc::new(FakeWeather::default()), history, 5);

    let paris = message("weather in Paris?", None, "100.1");
    let oslo = message("weather in Oslo?", None, "200.1");
    backend.answer(&paris, &paris.session_key()).await;
    backend.answer(&oslo, &oslo.session_key()).await;

    assert_eq!(model.inputs()[1], vec![Turn::human("weather in Oslo?")]);
}

#[tokio::test]
async fn test_round_trip_limit_is_reported_as_error_reply() {
    let model = ScriptedModel::new(vec![
        call_weather("call_1", "Tokyo"),
        call_weather("call_2", "Tokyo"),
        call_weather("call_3", "Tokyo"),
    ]);
    let weather = Arc::new(FakeWeather::default());
    let history = Arc::new(InMemoryHistoryStore::new());
    let backend = backend(model, weather.clone(), history.clone(), 2);

    let msg = message("weather in Tokyo?", None, "100.1");
    let Answer::Reply(text) = backend.answer(&msg, &msg.session_key()).await else {
        panic!("expected a reply");
    };

    assert!(text.starts_with("Error getting weather"), "got: {text}");
    assert_eq!(weather.cities.lock().unwrap().len(), 2);
    // Failed runs leave no trace in the thread history.
    assert!(history.get(&msg.session_key()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_model_failure_is_rendered_and_not_persisted() {
    let model = ScriptedModel::new(vec![Err(BotError::LlmError("status 503".to_string()))]);
    let history = Arc::new(InMemoryHistoryStore::new());
    let backend = backend(model, Arc::new(FakeWeather::default()), history.clone(), 5);

    let msg = message("weather in Tokyo?", None, "100.1");
    let answer = backend.answer(&msg, &msg.session_key()).await;

    assert_eq!(
        answer,
        Answer::Reply("Error getting weather: Failed to access LLM API: status 503".to_string())
    );
    assert!(history.get(&msg.session_key()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_tool_arguments_are_fed_back_to_model() {
    let model = ScriptedModel::new(vec![
        Ok(ModelOutput {
            text: String::new(),
            tool_requests: vec![
                ToolRequest {
                    id: "call_1".to_string(),
                    name: "weather_tool".to_string(),
                    arguments: "{}".to_string(),
                },
                ToolRequest {
                    id: "call_2".to_string(),
                    name: "stock_tool".to_string(),
                    arguments: "{}".to_string(),
                },
            ],
        }),
        say("Which city did you mean?"),
    ]);
    let weather = Arc::new(FakeWeather::default());
    let backend = backend(
        model.clone(),
        weather.clone(),
        Arc::new(InMemoryHistoryStore::new()),
        5,
    );

    let msg = message("weather?", None, "1.0");
    let answer = backend.answer(&msg, &msg.session_key()).await;

    assert_eq!(answer, Answer::Reply("Which city did you mean?".to_string()));
    assert!(weather.cities.lock().unwrap().is_empty());

    let second_input = &model.inputs()[1];
    let results: Vec<&str> = second_input
        .iter()
        .filter_map(|turn| match turn {
            Turn::ToolResult { content, .. } => Some(content.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|c| c.starts_with("Error:")));
}

#[tokio::test]
async fn test_empty_model_answer_is_rendered_as_error() {
    let model = ScriptedModel::new(vec![say("   ")]);
    let history = Arc::new(InMemoryHistoryStore::new());
    let backend = backend(model, Arc::new(FakeWeather::default()), history.clone(), 5);

    let msg = message("weather in Tokyo?", None, "100.1");
    let Answer::Reply(text) = backend.answer(&msg, &msg.session_key()).await else {
        panic!("expected a reply");
    };

    assert_eq!(
        text,
        "Error getting weather: Failed to access LLM API: model returned an empty answer"
    );
    assert!(history.get(&msg.session_key()).await.unwrap().is_empty());
}
