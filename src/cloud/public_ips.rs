//! Public IP address lookups and upserts

use async_trait::async_trait;

use super::client::ArmClient;
use super::error::AzureError;
use super::types::PublicIpAddress;

#[async_trait]
pub trait PublicIpsClient: Send + Sync {
    async fn get(&self, resource_group: &str, name: &str) -> Result<PublicIpAddress, AzureError>;

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        ip: &PublicIpAddress,
    ) -> Result<(), AzureError>;
}

/// [`PublicIpsClient`] backed by Azure Resource Manager
#[derive(Clone)]
pub struct AzurePublicIpsClient {
    arm: ArmClient,
}

impl AzurePublicIpsClient {
    pub fn new(arm: ArmClient) -> Self {
        Self { arm }
    }

    fn url(&self, resource_group: &str, name: &str) -> String {
        self.arm
            .network_resource_url(resource_group, &format!("publicIPAddresses/{name}"))
    }
}

#[async_trait]
impl PublicIpsClient for AzurePublicIpsClient {
    async fn get(&self, resource_group: &str, name: &str) -> Result<PublicIpAddress, AzureError> {
        self.arm.get_resource(&self.url(resource_group, name)).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        ip: &PublicIpAddress,
    ) -> Result<(), AzureError> {
        self.arm.put_resource(&self.url(resource_group, name), ip).await
    }
}
