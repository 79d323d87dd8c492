//! Bastion host upserts and deletes

use async_trait::async_trait;

use super::client::ArmClient;
use super::error::AzureError;
use super::types::BastionHost;

#[async_trait]
pub trait BastionHostsClient: Send + Sync {
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        host: &BastionHost,
    ) -> Result<(), AzureError>;

    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), AzureError>;
}

/// [`BastionHostsClient`] backed by Azure Resource Manager
#[derive(Clone)]
pub struct AzureBastionHostsClient {
    arm: ArmClient,
}

impl AzureBastionHostsClient {
    pub fn new(arm: ArmClient) -> Self {
        Self { arm }
    }

    fn url(&self, resource_group: &str, name: &str) -> String {
        self.arm
            .network_resource_url(resource_group, &format!("bastionHosts/{name}"))
    }
}

#[async_trait]
impl BastionHostsClient for AzureBastionHostsClient {
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        host: &BastionHost,
    ) -> Result<(), AzureError> {
        self.arm
            .put_resource(&self.url(resource_group, name), host)
            .await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> Result<(), AzureError> {
        self.arm.delete_resource(&self.url(resource_group, name)).await
    }
}
