//! Subnet lookups

use async_trait::async_trait;

use super::client::ArmClient;
use super::error::AzureError;
use super::types::Subnet;

#[async_trait]
pub trait SubnetsClient: Send + Sync {
    async fn get(
        &self,
        resource_group: &str,
        vnet_name: &str,
        subnet_name: &str,
    ) -> Result<Subnet, AzureError>;
}

/// [`SubnetsClient`] backed by Azure Resource Manager
#[derive(Clone)]
pub struct AzureSubnetsClient {
    arm: ArmClient,
}

impl AzureSubnetsClient {
    pub fn new(arm: ArmClient) -> Self {
        Self { arm }
    }
}

#[async_trait]
impl SubnetsClient for AzureSubnetsClient {
    async fn get(
        &self,
        resource_group: &str,
        vnet_name: &str,
        subnet_name: &str,
    ) -> Result<Subnet, AzureError> {
        let url = self.arm.network_resource_url(
            resource_group,
            &format!("virtualNetworks/{vnet_name}/subnets/{subnet_name}"),
        );
        self.arm.get_resource(&url).await
    }
}
