use serde::Deserialize;
use serde_json::{Value, json};

use crate::errors::BotError;

pub const WEATHER_TOOL_NAME: &str = "weather_tool";

/// Function-calling schema advertised to the model.
#[must_use]
pub fn weather_tool_definition() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": WEATHER_TOOL_NAME,
            "description": "Get the weather for a given city.",
            "parameters": {
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "City name, e.g. Tokyo"
                    }
                },
                "required": ["city"]
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct WeatherToolArgs {
    city: String,
}

/// Extracts the `city` argument from a tool call's JSON arguments.
///
/// # Errors
///
/// Returns a parse error if the arguments are not JSON or `city` is blank.
pub fn parse_city_argument(arguments: &str) -> Result<String, BotError> {
    let args: WeatherToolArgs = serde_json::from_str(arguments)
        .map_err(|e| BotError::ParseError(format!("invalid {WEATHER_TOOL_NAME} arguments: {e}")))?;
    let city = args.city.trim();
    if city.is_empty() {
        return Err(BotError::ParseError(format!(
            "{WEATHER_TOOL_NAME} requires a non-empty city"
        )));
    }
    Ok(city.to_string())
}
