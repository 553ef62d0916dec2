use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GEOCODING_BASE_URL: &str = "https://geocoding-api.open-meteo.com";
pub const DEFAULT_FORECAST_BASE_URL: &str = "https://api.open-meteo.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_WEBHOOK_URL: &str =
    "http://localhost:8080/webhook/6216d667-5564-454c-9947-bc27ba3de28e";

/// Which answer-providing service the bot delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Managed Bedrock agent invoked per thread session.
    Agent,
    /// Local LLM with the weather tool and per-thread history.
    Llm,
    /// Forward to an automation webhook; the downstream system replies.
    Webhook,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "agent" | "bedrock" => Ok(Self::Agent),
            "llm" | "langchain" => Ok(Self::Llm),
            "webhook" | "n8n" => Ok(Self::Webhook),
            other => Err(format!("unknown backend '{other}'")),
        }
    }
}

/// Where the agent identifiers come from when they are not set explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningConfig {
    Terraform { dir: String },
    Ssm { prefix: String },
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub geocoding_base_url: String,
    pub forecast_base_url: String,
    pub timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_base_url: DEFAULT_GEOCODING_BASE_URL.to_string(),
            forecast_base_url: DEFAULT_FORECAST_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl WeatherConfig {
    /// Reads the weather settings, falling back to the public Open-Meteo hosts.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            geocoding_base_url: lookup("GEOCODING_BASE_URL")
                .unwrap_or(defaults.geocoding_base_url),
            forecast_base_url: lookup("FORECAST_BASE_URL").unwrap_or(defaults.forecast_base_url),
            timeout: lookup("WEATHER_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map_or(defaults.timeout, Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack_bot_token: String,
    pub slack_signing_secret: String,
    pub backend: BackendKind,
    pub bedrock_agent_id: Option<String>,
    pub bedrock_agent_alias_id: Option<String>,
    pub provisioning: ProvisioningConfig,
    pub openai_api_key: Option<String>,
    pub openai_org_id: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub max_tool_round_trips: usize,
    pub webhook_url: String,
    pub webhook_ack_timeout: Duration,
    pub weather: WeatherConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns the name of the first required variable that is missing, or a
    /// description of a value that does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let require = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| format!("{name}: environment variable not found"))
        };

        let backend = match lookup("WEATHER_BACKEND") {
            Some(raw) => raw
                .parse::<BackendKind>()
                .map_err(|e| format!("WEATHER_BACKEND: {e}"))?,
            None => BackendKind::Agent,
        };

        let provisioning_source = lookup("PROVISIONING_SOURCE")
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty());
        let provisioning = match provisioning_source.as_deref() {
            None | Some("terraform") => ProvisioningConfig::Terraform {
                dir: lookup("TERRAFORM_DIR").unwrap_or_else(|| "infra".to_string()),
            },
            Some("ssm") => ProvisioningConfig::Ssm {
                prefix: lookup("PROVISIONING_SSM_PREFIX")
                    .unwrap_or_else(|| "/weatherbot/".to_string()),
            },
            Some(other) => return Err(format!("PROVISIONING_SOURCE: unknown source '{other}'")),
        };

        let max_tool_round_trips = match lookup("LLM_MAX_TOOL_ROUND_TRIPS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) | Err(_) => {
                    return Err(format!(
                        "LLM_MAX_TOOL_ROUND_TRIPS: expected a positive integer, got '{raw}'"
                    ));
                }
                Ok(n) => n,
            },
            None => 5,
        };

        let webhook_ack_timeout = match lookup("WEBHOOK_ACK_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(
                raw.parse::<u64>()
                    .map_err(|e| format!("WEBHOOK_ACK_TIMEOUT_MS: {e}"))?,
            ),
            None => Duration::from_millis(1500),
        };

        Ok(Self {
            slack_bot_token: require("SLACK_BOT_TOKEN")?,
            slack_signing_secret: require("SLACK_SIGNING_SECRET")?,
            backend,
            bedrock_agent_id: lookup("BEDROCK_AGENT_ID").filter(|v| !v.is_empty()),
            bedrock_agent_alias_id: lookup("BEDROCK_AGENT_ALIAS_ID").filter(|v| !v.is_empty()),
            provisioning,
            openai_api_key: lookup("OPENAI_API_KEY").filter(|v| !v.is_empty()),
            openai_org_id: lookup("OPENAI_ORG_ID").filter(|v| !v.trim().is_empty()),
            openai_model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            max_tool_round_trips,
            webhook_url: lookup("WEBHOOK_URL").unwrap_or_else(|| DEFAULT_WEBHOOK_URL.to_string()),
            webhook_ack_timeout,
            weather: WeatherConfig::from_lookup(&lookup),
        })
    }
}
