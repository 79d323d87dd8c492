//! Operator configuration from flags and environment

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, ValueEnum};

use crate::cloud::{
    ArmClient, ArmSettings, ClientSecretCredential, StaticTokenCredential, TokenCredential,
    DEFAULT_AUTHORITY_HOST, DEFAULT_RESOURCE_MANAGER_ENDPOINT,
};
use crate::error::{Error, Result};

/// Azure credentials and Resource Manager settings
#[derive(Args, Debug, Clone)]
pub struct AzureConfig {
    /// Subscription to operate in; an AzureCluster's spec.subscriptionId wins over it
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription_id: Option<String>,

    #[arg(long, env = "AZURE_TENANT_ID")]
    pub tenant_id: Option<String>,

    #[arg(long, env = "AZURE_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, env = "AZURE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Pre-acquired ARM bearer token; skips the client-credentials flow
    #[arg(long, env = "AZURE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[arg(
        long,
        env = "AZURE_RESOURCE_MANAGER_ENDPOINT",
        default_value = DEFAULT_RESOURCE_MANAGER_ENDPOINT
    )]
    pub resource_manager_endpoint: String,

    #[arg(long, env = "AZURE_AUTHORITY_HOST", default_value = DEFAULT_AUTHORITY_HOST)]
    pub authority_host: String,

    /// Seconds between polls of a long-running ARM operation
    #[arg(long, env = "AZURE_POLL_INTERVAL_SECS", default_value_t = 5)]
    pub poll_interval_secs: u64,

    /// Seconds a single long-running ARM operation may take
    #[arg(long, env = "AZURE_OPERATION_TIMEOUT_SECS", default_value_t = 1800)]
    pub operation_timeout_secs: u64,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            subscription_id: None,
            tenant_id: None,
            client_id: None,
            client_secret: None,
            access_token: None,
            resource_manager_endpoint: DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            poll_interval_secs: 5,
            operation_timeout_secs: 1800,
        }
    }
}

impl AzureConfig {
    /// Static token if one is configured, otherwise a service principal.
    pub fn credential(&self, http: reqwest::Client) -> Result<Arc<dyn TokenCredential>> {
        if let Some(token) = non_empty(&self.access_token) {
            return Ok(Arc::new(StaticTokenCredential::new(token)));
        }

        match (
            non_empty(&self.tenant_id),
            non_empty(&self.client_id),
            non_empty(&self.client_secret),
        ) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => {
                Ok(Arc::new(ClientSecretCredential::new(
                    http,
                    &self.authority_host,
                    tenant_id,
                    client_id,
                    client_secret,
                    &self.resource_manager_endpoint,
                )))
            }
            _ => Err(Error::ConfigError(
                "no Azure credentials: set AZURE_ACCESS_TOKEN or AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET"
                    .to_string(),
            )),
        }
    }

    /// Build an ARM client; `subscription_override` comes from the cluster spec.
    pub fn arm_client(&self, subscription_override: Option<&str>) -> Result<ArmClient> {
        let subscription_id = subscription_override
            .filter(|s| !s.is_empty())
            .or_else(|| non_empty(&self.subscription_id))
            .ok_or_else(|| {
                Error::ConfigError(
                    "no subscription: set AZURE_SUBSCRIPTION_ID or spec.subscriptionId"
                        .to_string(),
                )
            })?
            .to_string();

        let http = reqwest::Client::builder()
            .user_agent(concat!("bastion-k8s/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(crate::cloud::AzureError::from)?;
        let credential = self.credential(http.clone())?;

        Ok(ArmClient::new(
            http,
            credential,
            ArmSettings {
                endpoint: self.resource_manager_endpoint.clone(),
                subscription_id,
                poll_interval: Duration::from_secs(self.poll_interval_secs),
                operation_timeout: Duration::from_secs(self.operation_timeout_secs),
            },
        ))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Log output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_takes_precedence() {
        let config = AzureConfig {
            access_token: Some("tok".to_string()),
            ..Default::default()
        };
        assert!(config.credential(reqwest::Client::new()).is_ok());
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let config = AzureConfig {
            tenant_id: Some("t".to_string()),
            client_id: Some("c".to_string()),
            client_secret: Some(String::new()),
            ..Default::default()
        };
        let err = config.credential(reqwest::Client::new()).err().unwrap();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_subscription_override_wins() {
        let config = AzureConfig {
            subscription_id: Some("env-sub".to_string()),
            access_token: Some("tok".to_string()),
            ..Default::default()
        };
        let arm = config.arm_client(Some("spec-sub")).unwrap();
        assert_eq!(arm.subscription_id(), "spec-sub");

        let arm = config.arm_client(None).unwrap();
        assert_eq!(arm.subscription_id(), "env-sub");
    }

    #[test]
    fn test_missing_subscription_is_config_error() {
        let config = AzureConfig {
            access_token: Some("tok".to_string()),
            ..Default::default()
        };
        let err = config.arm_client(Some("")).err().unwrap();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
