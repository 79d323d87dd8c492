//! Bastion host reconciliation
//!
//! `reconcile` resolves the bastion subnet, makes sure the bastion public IP
//! exists (creating it when the lookup reports it missing) and upserts the
//! bastion host. `delete` removes the bastion hosts again. Both walk the
//! scope's bastion specs in order and stop at the first failure.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::cloud::tags::{build_tags, BuildParams, ResourceLifecycle, BASTION_ROLE};
use crate::cloud::{
    ArmClient, AzureBastionHostsClient, AzureError, AzurePublicIpsClient, AzureSubnetsClient,
    BastionHost, BastionHostIpConfiguration, BastionHostIpConfigurationPropertiesFormat,
    BastionHostPropertiesFormat, BastionHostsClient, IpAllocationMethod, IpVersion,
    PublicIpAddress, PublicIpAddressDnsSettings, PublicIpAddressPropertiesFormat,
    PublicIpAddressSku, PublicIpAddressSkuName, PublicIpsClient, SubResource, SubnetsClient,
};
use crate::error::{Error, Result};

use super::scope::{BastionSpec, ClusterScope};

/// Name of the single IP configuration of a bastion host
pub fn bastion_ip_config_name(bastion_name: &str) -> String {
    format!("{bastion_name}-bastionIP")
}

/// DNS name of a bastion host
pub fn bastion_dns_name(bastion_name: &str) -> String {
    format!("{}-bastion", bastion_name.to_lowercase())
}

/// Desired state of a bastion public IP: Standard SKU, static IPv4.
pub fn build_bastion_public_ip(ip_name: &str, location: &str) -> PublicIpAddress {
    PublicIpAddress {
        name: Some(ip_name.to_string()),
        location: Some(location.to_string()),
        sku: Some(PublicIpAddressSku {
            name: PublicIpAddressSkuName::Standard,
        }),
        properties: Some(PublicIpAddressPropertiesFormat {
            public_ip_address_version: Some(IpVersion::IPv4),
            public_ip_allocation_method: Some(IpAllocationMethod::Static),
            dns_settings: Some(PublicIpAddressDnsSettings {
                domain_name_label: Some(ip_name.to_lowercase()),
                fqdn: None,
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Desired state of a bastion host wired to the given subnet and public IP.
pub fn build_bastion_host(
    scope: &dyn ClusterScope,
    spec: &BastionSpec,
    subnet_id: Option<String>,
    public_ip_id: Option<String>,
) -> BastionHost {
    let tags = build_tags(BuildParams {
        cluster_name: scope.cluster_name().to_string(),
        lifecycle: ResourceLifecycle::Owned,
        name: Some(spec.name.clone()),
        role: Some(BASTION_ROLE.to_string()),
        additional: scope.additional_tags().clone(),
    });

    BastionHost {
        name: Some(spec.name.clone()),
        location: Some(scope.location().to_string()),
        tags: Some(tags),
        properties: Some(BastionHostPropertiesFormat {
            dns_name: Some(bastion_dns_name(&spec.name)),
            ip_configurations: Some(vec![BastionHostIpConfiguration {
                name: Some(bastion_ip_config_name(&spec.name)),
                properties: Some(BastionHostIpConfigurationPropertiesFormat {
                    subnet: Some(SubResource::new(subnet_id)),
                    public_ip_address: Some(SubResource::new(public_ip_id)),
                    private_ip_allocation_method: Some(IpAllocationMethod::Static),
                }),
            }]),
            provisioning_state: None,
        }),
        ..Default::default()
    }
}

/// Reconciles the bastion hosts of one cluster scope
pub struct BastionHostService {
    scope: Arc<dyn ClusterScope>,
    subnets: Arc<dyn SubnetsClient>,
    public_ips: Arc<dyn PublicIpsClient>,
    client: Arc<dyn BastionHostsClient>,
}

impl BastionHostService {
    pub fn new(
        scope: Arc<dyn ClusterScope>,
        subnets: Arc<dyn SubnetsClient>,
        public_ips: Arc<dyn PublicIpsClient>,
        client: Arc<dyn BastionHostsClient>,
    ) -> Self {
        Self {
            scope,
            subnets,
            public_ips,
            client,
        }
    }

    /// Service wired to the Azure Resource Manager clients.
    pub fn with_arm_client(scope: Arc<dyn ClusterScope>, arm: ArmClient) -> Self {
        Self::new(
            scope,
            Arc::new(AzureSubnetsClient::new(arm.clone())),
            Arc::new(AzurePublicIpsClient::new(arm.clone())),
            Arc::new(AzureBastionHostsClient::new(arm)),
        )
    }

    /// Get, create or update every bastion host of the scope.
    #[instrument(skip(self), fields(cluster = %self.scope.cluster_name(), resource_group = %self.scope.resource_group()))]
    pub async fn reconcile(&self) -> Result<()> {
        let resource_group = self.scope.resource_group();

        for spec in self.scope.bastion_specs() {
            debug!(subnet = %spec.subnet_name, vnet = %spec.vnet_name, "Getting subnet in vnet");
            let subnet = self
                .subnets
                .get(resource_group, &spec.vnet_name, &spec.subnet_name)
                .await
                .map_err(Error::GetSubnet)?;
            debug!(subnet = %spec.subnet_name, vnet = %spec.vnet_name, "Got subnet in vnet");

            debug!(public_ip = %spec.public_ip_name, "Checking if public IP exists, creating it otherwise");
            let public_ip = match self.public_ips.get(resource_group, &spec.public_ip_name).await {
                Ok(ip) => ip,
                Err(e) if e.is_not_found() => {
                    self.create_bastion_public_ip(&spec.public_ip_name)
                        .await
                        .map_err(Error::CreatePublicIp)?;
                    self.public_ips
                        .get(resource_group, &spec.public_ip_name)
                        .await
                        .map_err(Error::GetCreatedPublicIp)?
                }
                Err(e) => return Err(Error::GetExistingPublicIp(e)),
            };
            debug!(public_ip = %spec.public_ip_name, "Got public IP");

            debug!(bastion = %spec.name, "Creating bastion host");
            let host = build_bastion_host(self.scope.as_ref(), &spec, subnet.id, public_ip.id);
            self.client
                .create_or_update(resource_group, &spec.name, &host)
                .await
                .map_err(Error::CreateBastionHost)?;
            debug!(bastion = %spec.name, "Created bastion host");
        }

        Ok(())
    }

    /// Delete every bastion host of the scope.
    ///
    /// A host that is already gone ends the whole pass successfully; specs
    /// after it are not visited.
    #[instrument(skip(self), fields(cluster = %self.scope.cluster_name(), resource_group = %self.scope.resource_group()))]
    pub async fn delete(&self) -> Result<()> {
        let resource_group = self.scope.resource_group();

        for spec in self.scope.bastion_specs() {
            debug!(bastion = %spec.name, "Deleting bastion host");
            match self.client.delete(resource_group, &spec.name).await {
                Ok(()) => debug!(bastion = %spec.name, "Deleted bastion host"),
                Err(e) if e.is_not_found() => {
                    debug!(bastion = %spec.name, "Bastion host already deleted");
                    return Ok(());
                }
                Err(source) => {
                    return Err(Error::DeleteBastionHost {
                        name: spec.name.clone(),
                        resource_group: resource_group.to_string(),
                        source,
                    })
                }
            }
        }

        Ok(())
    }

    async fn create_bastion_public_ip(&self, ip_name: &str) -> std::result::Result<(), AzureError> {
        debug!(public_ip = %ip_name, "Creating bastion public IP");
        let ip = build_bastion_public_ip(ip_name, self.scope.location());
        self.public_ips
            .create_or_update(self.scope.resource_group(), ip_name, &ip)
            .await
    }
}
