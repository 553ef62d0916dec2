use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;
use weatherbot::action::{ActionGroupEvent, INVALID_PARAMETERS, handle_action};
use weatherbot::core::config::WeatherConfig;
use weatherbot::weather::WeatherClient;

fn client_for(server: &MockServer) -> WeatherClient {
    WeatherClient::new(&WeatherConfig {
        geocoding_base_url: server.base_url(),
        forecast_base_url: server.base_url(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn action_event(parameters: serde_json::Value) -> ActionGroupEvent {
    serde_json::from_value(json!({
        "messageVersion": "1.0",
        "agent": {"name": "weather-assistant", "id": "AGENT1", "alias": "ALIAS1", "version": "1"},
        "sessionId": "C1-100.1",
        "actionGroup": "get-weather-from-lambda",
        "function": "get-weather-data",
        "parameters": parameters
    }))
    .unwrap()
}

#[tokio::test]
async fn test_missing_location_is_failure_without_lookup() {
    let server = MockServer::start_async().await;
    let geocode = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/search");
            then.status(200).json_body(json!({}));
        })
        .await;

    let response = handle_action(
        &client_for(&server),
        &action_event(json!([{"name": "intent", "type": "string", "value": "get_weather"}])),
    )
    .await;

    assert!(response.is_failure());
    assert_eq!(response.body(), INVALID_PARAMETERS);
    assert_eq!(geocode.hits_async().await, 0);

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["response"]["functionResponse"]["responseState"], "FAILURE");
}

#[tokio::test]
async fn test_wrong_intent_is_failure() {
    let server = MockServer::start_async().await;
    let response = handle_action(
        &client_for(&server),
        &action_event(json!([
            {"name": "location", "type": "string", "value": "Paris"},
            {"name": "intent", "type": "string", "value": "book_flight"}
        ])),
    )
    .await;

    assert!(response.is_failure());
    assert_eq!(response.body(), INVALID_PARAMETERS);
}

#[tokio::test]
async fn test_successful_lookup_has_no_response_state() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/search").query_param("name", "Paris");
            then.status(200).json_body(json!({
                "results": [{"latitude": 48.85, "longitude": 2.35}]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/forecast");
            then.status(200).json_body(json!({
                "current": {
                    "temperature_2m": 20.0,
                    "relative_humidity_2m": 55,
                    "wind_speed_10m": 9.0,
                    "weather_code": 1
                }
            }));
        })
        .await;

    let response = handle_action(
        &client_for(&server),
        &action_event(json!([
            {"name": "location", "type": "string", "value": "Paris"},
            {"name": "intent", "type": "string", "value": "get_weather"}
        ])),
    )
    .await;

    assert!(!response.is_failure());
    assert!(response.body().starts_with("Weather for Paris:\nTemperature: 68.0°F"));

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["messageVersion"], "1.0");
    assert_eq!(value["response"]["actionGroup"], "get-weather-from-lambda");
    assert_eq!(value["response"]["function"], "get-weather-data");
    assert!(value["response"]["functionResponse"].get("responseState").is_none());
}

#[tokio::test]
async fn test_unknown_location_is_failure_with_reason() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/search");
            then.status(200).json_body(json!({"results": []}));
        })
        .await;

    let response = handle_action(
        &client_for(&server),
        &action_event(json!([
            {"name": "location", "type": "string", "value": "Atlantis"},
            {"name": "intent", "type": "string", "value": "get_weather"}
        ])),
    )
    .await;

    assert!(response.is_failure());
    assert_eq!(response.body(), "Could not find coordinates for city: Atlantis");
}
