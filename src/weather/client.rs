//! Open-Meteo geocoding and forecast client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};
use url::Url;

use super::codes::{celsius_to_fahrenheit, describe_weather_code};
use crate::core::config::WeatherConfig;
use crate::errors::BotError;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,weather_code";

/// Current conditions at one location.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub temperature_fahrenheit: f64,
    pub condition_code: i64,
    pub humidity_percent: u32,
    pub wind_speed_mph: f64,
}

impl WeatherSnapshot {
    /// Renders the multi-line report shown to users.
    #[must_use]
    pub fn report(&self, city: &str) -> String {
        format!(
            "Weather for {city}:\n\
             Temperature: {:.1}°F\n\
             Conditions: {}\n\
             Humidity: {}%\n\
             Wind Speed: {:.1} mph",
            self.temperature_fahrenheit,
            describe_weather_code(self.condition_code),
            self.humidity_percent,
            self.wind_speed_mph,
        )
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    weather_code: i64,
}

/// Anything that can turn a city name into a weather report string.
///
/// Implementations never fail: errors are folded into the returned text.
#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn lookup(&self, city: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    geocoding_base_url: String,
    forecast_base_url: String,
}

impl WeatherClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &WeatherConfig) -> Result<Self, BotError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BotError::HttpError(format!("Failed to build weather HTTP client: {e}")))?;

        Ok(Self {
            http,
            geocoding_base_url: config.geocoding_base_url.clone(),
            forecast_base_url: config.forecast_base_url.clone(),
        })
    }

    fn endpoint(base: &str, path: &str) -> Result<Url, BotError> {
        Url::parse(base)
            .and_then(|u| u.join(path))
            .map_err(|e| BotError::WeatherError(format!("Invalid weather endpoint {base}: {e}")))
    }

    /// Resolves `city` to `(latitude, longitude)`.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::WeatherError`] when the city is unknown, and an
    /// HTTP error when the request fails.
    pub async fn coordinates(&self, city: &str) -> Result<(f64, f64), BotError> {
        let url = Self::endpoint(&self.geocoding_base_url, "/v1/search")?;
        let body: GeocodingResponse = self
            .http
            .get(url)
            .query(&[
                ("name", city),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?
            .json()
            .await?;

        body.results
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|r| (r.latitude, r.longitude))
            .ok_or_else(|| {
                BotError::WeatherError(format!("Could not find coordinates for city: {city}"))
            })
    }

    /// Fetches current conditions for a coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Open-Meteo reports an error.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub async fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherSnapshot, BotError> {
        let url = Self::endpoint(&self.forecast_base_url, "/v1/forecast")?;
        let body: Value = self
            .http
            .get(url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("wind_speed_unit", "mph".to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        let failed = match body.get("error") {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Null) | None => false,
            Some(_) => true,
        };
        if failed {
            let reason = body
                .get("reason")
                .and_then(Value::as_str)
                .map_or_else(|| body["error"].to_string(), ToString::to_string);
            return Err(BotError::WeatherError(format!("Weather API error: {reason}")));
        }

        let current: CurrentConditions = body
            .get("current")
            .cloned()
            .ok_or_else(|| BotError::WeatherError("Weather API response missing current".into()))
            .and_then(|c| serde_json::from_value(c).map_err(BotError::from))?;

        Ok(WeatherSnapshot {
            temperature_fahrenheit: celsius_to_fahrenheit(current.temperature_2m),
            condition_code: current.weather_code,
            humidity_percent: current.relative_humidity_2m.round().clamp(0.0, 100.0) as u32,
            wind_speed_mph: current.wind_speed_10m,
        })
    }

    /// Geocodes `city` and fetches its current conditions.
    ///
    /// # Errors
    ///
    /// Propagates the first failing call.
    pub async fn fetch(&self, city: &str) -> Result<WeatherSnapshot, BotError> {
        let (latitude, longitude) = self.coordinates(city).await?;
        info!(city = %city, latitude, longitude, "Resolved coordinates");
        self.current_conditions(latitude, longitude).await
    }
}

#[async_trait]
impl WeatherLookup for WeatherClient {
    async fn lookup(&self, city: &str) -> String {
        match self.fetch(city).await {
            Ok(snapshot) => snapshot.report(city),
            Err(e) => {
                error!(city = %city, "Error in weather lookup: {}", e);
                format!("Error fetching weather for {city}: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format() {
        let snapshot = WeatherSnapshot {
            temperature_fahrenheit: 68.0,
            condition_code: 2,
            humidity_percent: 55,
            wind_speed_mph: 7.24,
        };

        assert_eq!(
            snapshot.report("Tokyo"),
            "Weather for Tokyo:\nTemperature: 68.0°F\nConditions: Partly cloudy\nHumidity: 55%\nWind Speed: 7.2 mph"
        );
    }

    #[test]
    fn test_report_with_unknown_code() {
        let snapshot = WeatherSnapshot {
            temperature_fahrenheit: 10.0,
            condition_code: 1234,
            humidity_percent: 0,
            wind_speed_mph: 0.0,
        };
        assert!(snapshot.report("X").contains("Conditions: Unknown weather condition"));
    }

    #[test]
    fn test_invalid_base_url_is_weather_error() {
        assert!(matches!(
            WeatherClient::endpoint("not a url", "/v1/search"),
            Err(BotError::WeatherError(_))
        ));
    }
}
