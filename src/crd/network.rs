//! Network placement types shared by the AzureCluster spec

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Azure requires the bastion subnet to carry exactly this name.
pub const AZURE_BASTION_SUBNET_NAME: &str = "AzureBastionSubnet";

/// CIDR assigned to the bastion subnet when none is given.
pub const DEFAULT_AZURE_BASTION_SUBNET_CIDR: &str = "10.1.255.0/24";

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpec {
    #[serde(default)]
    pub vnet: VnetSpec,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VnetSpec {
    /// Resource group of the virtual network; defaults to the cluster's.
    /// Informational only: the bastion subnet is looked up in the cluster's
    /// resource group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,

    /// Defaults to `<cluster>-vnet`
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cidr_blocks: Vec<String>,
}

/// Bastion settings of an AzureCluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BastionConfig {
    /// Managed Azure Bastion; no bastion is provisioned when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_bastion: Option<AzureBastion>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AzureBastion {
    /// Defaults to `<cluster>-azure-bastion`
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub subnet: SubnetSpec,

    #[serde(default, rename = "publicIP")]
    pub public_ip: PublicIpSpec,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cidr_blocks: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpSpec {
    /// Defaults to `<cluster>-azure-bastion-pip`
    #[serde(default)]
    pub name: String,
}

pub fn generate_vnet_name(cluster_name: &str) -> String {
    format!("{cluster_name}-vnet")
}

pub fn generate_azure_bastion_name(cluster_name: &str) -> String {
    format!("{cluster_name}-azure-bastion")
}

pub fn generate_azure_bastion_public_ip_name(cluster_name: &str) -> String {
    format!("{cluster_name}-azure-bastion-pip")
}
