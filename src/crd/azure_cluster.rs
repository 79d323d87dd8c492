//! AzureCluster Custom Resource Definition
//!
//! The AzureCluster CRD describes where a workload cluster lives in Azure
//! (subscription, resource group, location, virtual network) and whether it
//! gets a managed Azure Bastion host for operator access.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::path::Path;

use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::network::{
    generate_azure_bastion_name, generate_azure_bastion_public_ip_name, generate_vnet_name,
    BastionConfig, NetworkSpec, AZURE_BASTION_SUBNET_NAME, DEFAULT_AZURE_BASTION_SUBNET_CIDR,
};
use crate::error::{Error, Result};

/// Structured validation error for `AzureClusterSpec`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecValidationError {
    pub field: String,
    pub message: String,
    pub how_to_fix: String,
}

impl SpecValidationError {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        how_to_fix: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            how_to_fix: how_to_fix.into(),
        }
    }
}

impl std::fmt::Display for SpecValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.how_to_fix)
    }
}

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1alpha3",
    kind = "AzureCluster",
    namespaced,
    shortname = "azc",
    printcolumn = r#"{"name":"ResourceGroup","type":"string","jsonPath":".spec.resourceGroup"}"#,
    printcolumn = r#"{"name":"Location","type":"string","jsonPath":".spec.location"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct AzureClusterSpec {
    pub resource_group: String,
    pub location: String,

    /// Overrides the subscription taken from the operator's environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,

    /// Name of the owning Cluster API cluster; defaults to `metadata.name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,

    #[serde(default)]
    pub network_spec: NetworkSpec,

    #[serde(default)]
    pub bastion_spec: BastionConfig,

    /// Extra tags applied to every resource the provider creates
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_tags: BTreeMap<String, String>,
}

impl AzureCluster {
    /// Name used in ownership tags and generated resource names.
    pub fn cluster_name(&self) -> String {
        self.spec
            .cluster_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.name_any())
    }

    /// The spec with every omitted name filled in.
    pub fn defaulted_spec(&self) -> AzureClusterSpec {
        let mut spec = self.spec.clone();
        spec.set_defaults(&self.cluster_name());
        spec
    }
}

impl AzureClusterSpec {
    /// Fill in omitted vnet and bastion names.
    pub fn set_defaults(&mut self, cluster_name: &str) {
        let vnet = &mut self.network_spec.vnet;
        if vnet.name.is_empty() {
            vnet.name = generate_vnet_name(cluster_name);
        }
        if vnet.resource_group.as_deref().unwrap_or_default().is_empty() {
            vnet.resource_group = Some(self.resource_group.clone());
        }

        if let Some(bastion) = self.bastion_spec.azure_bastion.as_mut() {
            if bastion.name.is_empty() {
                bastion.name = generate_azure_bastion_name(cluster_name);
            }
            if bastion.subnet.name.is_empty() {
                bastion.subnet.name = AZURE_BASTION_SUBNET_NAME.to_string();
            }
            if bastion.subnet.cidr_blocks.is_empty() {
                bastion.subnet.cidr_blocks = vec![DEFAULT_AZURE_BASTION_SUBNET_CIDR.to_string()];
            }
            if bastion.public_ip.name.is_empty() {
                bastion.public_ip.name = generate_azure_bastion_public_ip_name(cluster_name);
            }
        }
    }

    /// Validate the spec; expected to run on a defaulted spec.
    pub fn validate(&self) -> std::result::Result<(), Vec<SpecValidationError>> {
        let mut errors: Vec<SpecValidationError> = Vec::new();

        if self.resource_group.trim().is_empty() {
            errors.push(SpecValidationError::new(
                "spec.resourceGroup",
                "resourceGroup must not be empty",
                "Set spec.resourceGroup to the Azure resource group holding the cluster.",
            ));
        } else if !is_valid_resource_group_name(&self.resource_group) {
            errors.push(SpecValidationError::new(
                "spec.resourceGroup",
                format!(
                    "{:?} is not a valid Azure resource group name",
                    self.resource_group
                ),
                "Use 1-90 letters, digits, '_', '-', '.', '(' or ')', not ending with '.'.",
            ));
        }

        if self.location.trim().is_empty() {
            errors.push(SpecValidationError::new(
                "spec.location",
                "location must not be empty",
                "Set spec.location to an Azure region such as westeurope.",
            ));
        }

        if !is_valid_resource_name(&self.network_spec.vnet.name) {
            errors.push(SpecValidationError::new(
                "spec.networkSpec.vnet.name",
                format!(
                    "{:?} is not a valid Azure resource name",
                    self.network_spec.vnet.name
                ),
                "Use 1-80 letters, digits, '_', '.' or '-', starting with a letter or digit and ending with a letter, digit or '_'.",
            ));
        }

        for (i, cidr) in self.network_spec.vnet.cidr_blocks.iter().enumerate() {
            if !is_valid_cidr(cidr) {
                errors.push(SpecValidationError::new(
                    format!("spec.networkSpec.vnet.cidrBlocks[{i}]"),
                    format!("{cidr} is not a valid IPv4 CIDR block"),
                    "Use address/prefix notation, e.g. 10.0.0.0/8.",
                ));
            }
        }

        if let Some(bastion) = &self.bastion_spec.azure_bastion {
            if !is_valid_resource_name(&bastion.name) {
                errors.push(SpecValidationError::new(
                    "spec.bastionSpec.azureBastion.name",
                    format!("{:?} is not a valid Azure resource name", bastion.name),
                    "Use 1-80 letters, digits, '_', '.' or '-', starting with a letter or digit and ending with a letter, digit or '_'.",
                ));
            }

            if bastion.subnet.name != AZURE_BASTION_SUBNET_NAME {
                errors.push(SpecValidationError::new(
                    "spec.bastionSpec.azureBastion.subnet.name",
                    format!(
                        "Azure Bastion subnet must be named {AZURE_BASTION_SUBNET_NAME}, got {:?}",
                        bastion.subnet.name
                    ),
                    format!("Set the subnet name to {AZURE_BASTION_SUBNET_NAME} or omit it."),
                ));
            }

            for (i, cidr) in bastion.subnet.cidr_blocks.iter().enumerate() {
                if !is_valid_cidr(cidr) {
                    errors.push(SpecValidationError::new(
                        format!("spec.bastionSpec.azureBastion.subnet.cidrBlocks[{i}]"),
                        format!("{cidr} is not a valid IPv4 CIDR block"),
                        "Use address/prefix notation, e.g. 10.1.255.0/24.",
                    ));
                }
            }

            if !is_valid_resource_name(&bastion.public_ip.name) {
                errors.push(SpecValidationError::new(
                    "spec.bastionSpec.azureBastion.publicIP.name",
                    format!(
                        "{:?} is not a valid Azure resource name",
                        bastion.public_ip.name
                    ),
                    "Use 1-80 letters, digits, '_', '.' or '-', starting with a letter or digit and ending with a letter, digit or '_'.",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Azure resource group naming rules.
pub fn is_valid_resource_group_name(name: &str) -> bool {
    let len = name.chars().count();
    (1..=90).contains(&len)
        && !name.ends_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '(' | ')'))
}

/// Azure network resource naming rules (vnets, bastion hosts, public IPs).
pub fn is_valid_resource_name(name: &str) -> bool {
    let len = name.chars().count();
    if !(1..=80).contains(&len) {
        return false;
    }
    let valid_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-');
    let starts_ok = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    let ends_ok = name
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');

    starts_ok && ends_ok && name.chars().all(valid_char)
}

/// IPv4 address/prefix notation; Azure Bastion subnets are IPv4 only.
pub fn is_valid_cidr(cidr: &str) -> bool {
    let Some((addr, prefix)) = cidr.split_once('/') else {
        return false;
    };
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    addr.parse::<Ipv4Addr>().is_ok() && prefix <= 32
}

/// Read an AzureCluster manifest from a YAML file.
pub fn load_manifest(path: &Path) -> Result<AzureCluster> {
    let contents = std::fs::read_to_string(path)?;
    let cluster: AzureCluster = serde_yaml::from_str(&contents)?;
    if cluster.metadata.name.as_deref().unwrap_or_default().is_empty() {
        return Err(Error::ValidationError(format!(
            "{} has no metadata.name",
            path.display()
        )));
    }
    Ok(cluster)
}
