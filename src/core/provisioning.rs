//! Resolution of the Bedrock agent identifiers from provisioning outputs.

use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_ssm::Client as SsmClient;
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use tokio::process::Command;
use tracing::{error, info};

use super::config::{AppConfig, ProvisioningConfig};
use crate::errors::BotError;

pub const AGENT_ID_OUTPUT: &str = "bedrock_agent_id";
pub const AGENT_ALIAS_ID_OUTPUT: &str = "weather_assistant_alias_id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentIdentifiers {
    pub agent_id: String,
    pub agent_alias_id: String,
}

/// A named string output produced by the infrastructure tooling.
#[async_trait]
pub trait ProvisioningSource: Send + Sync {
    /// Returns the output value, or `None` if it does not exist or is empty.
    async fn output(&self, name: &str) -> Result<Option<String>, BotError>;
}

/// Reads outputs with `terraform output -raw <name>`.
#[derive(Debug, Clone)]
pub struct TerraformOutputs {
    dir: String,
}

impl TerraformOutputs {
    #[must_use]
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ProvisioningSource for TerraformOutputs {
    async fn output(&self, name: &str) -> Result<Option<String>, BotError> {
        let output = Command::new("terraform")
            .args(["output", "-raw", name])
            .current_dir(&self.dir)
            .output()
            .await
            .with_context(|| format!("failed to run terraform in {}", self.dir))?;

        if !output.status.success() {
            error!(
                output = %name,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Terraform error"
            );
            return Ok(None);
        }

        Ok(non_empty(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Reads outputs published as SSM parameters under a common prefix.
#[derive(Debug, Clone)]
pub struct SsmOutputs {
    client: SsmClient,
    prefix: String,
}

impl SsmOutputs {
    pub async fn from_env(prefix: impl Into<String>) -> Self {
        let shared = aws_config::from_env().load().await;
        Self {
            client: SsmClient::new(&shared),
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl ProvisioningSource for SsmOutputs {
    async fn output(&self, name: &str) -> Result<Option<String>, BotError> {
        let parameter_name = parameter_name(&self.prefix, name);
        match self
            .client
            .get_parameter()
            .name(&parameter_name)
            .send()
            .await
        {
            Ok(resp) => Ok(resp
                .parameter
                .and_then(|p| p.value)
                .and_then(|v| non_empty(&v))),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(GetParameterError::is_parameter_not_found) =>
            {
                Ok(None)
            }
            Err(e) => Err(BotError::AwsError(format!(
                "ssm get_parameter {parameter_name}: {}",
                DisplayErrorContext(&e)
            ))),
        }
    }
}

fn parameter_name(prefix: &str, name: &str) -> String {
    let mut p = prefix.to_string();
    if !p.ends_with('/') {
        p.push('/');
    }
    format!("{p}{name}")
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Looks up both agent identifiers from `source`.
///
/// # Errors
///
/// Returns [`BotError::ConfigError`] naming every output that is missing.
pub async fn resolve_from_source(
    source: &dyn ProvisioningSource,
) -> Result<AgentIdentifiers, BotError> {
    let agent_id = source.output(AGENT_ID_OUTPUT).await?;
    let agent_alias_id = source.output(AGENT_ALIAS_ID_OUTPUT).await?;

    match (agent_id, agent_alias_id) {
        (Some(agent_id), Some(agent_alias_id)) => Ok(AgentIdentifiers {
            agent_id,
            agent_alias_id,
        }),
        (agent_id, alias_id) => {
            let missing: Vec<&str> = [
                agent_id.is_none().then_some(AGENT_ID_OUTPUT),
                alias_id.is_none().then_some(AGENT_ALIAS_ID_OUTPUT),
            ]
            .into_iter()
            .flatten()
            .collect();
            Err(BotError::ConfigError(format!(
                "missing provisioning outputs: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Resolves the agent identifiers for the configured deployment.
///
/// Explicit `BEDROCK_AGENT_ID` / `BEDROCK_AGENT_ALIAS_ID` values win; otherwise
/// the configured provisioning source is queried once.
///
/// # Errors
///
/// Returns an error if either identifier cannot be resolved.
pub async fn resolve_agent_identifiers(config: &AppConfig) -> Result<AgentIdentifiers, BotError> {
    if let (Some(agent_id), Some(agent_alias_id)) =
        (&config.bedrock_agent_id, &config.bedrock_agent_alias_id)
    {
        info!("Using agent identifiers from environment");
        return Ok(AgentIdentifiers {
            agent_id: agent_id.clone(),
            agent_alias_id: agent_alias_id.clone(),
        });
    }

    match &config.provisioning {
        ProvisioningConfig::Terraform { dir } => {
            info!(dir = %dir, "Resolving agent identifiers from terraform outputs");
            resolve_from_source(&TerraformOutputs::new(dir.clone())).await
        }
        ProvisioningConfig::Ssm { prefix } => {
            info!(prefix = %prefix, "Resolving agent identifiers from SSM");
            resolve_from_source(&SsmOutputs::from_env(prefix.clone()).await).await
        }
    }
}
