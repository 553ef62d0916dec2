//! Weather lookup tool backed by the public Open-Meteo APIs.

pub mod client;
pub mod codes;

pub use client::{WeatherClient, WeatherLookup, WeatherSnapshot};
pub use codes::{UNKNOWN_WEATHER_CONDITION, celsius_to_fahrenheit, describe_weather_code};
