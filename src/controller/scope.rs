//! Cluster scope: the per-pass view of an AzureCluster the workflows read

use std::collections::BTreeMap;

use crate::crd::{AzureCluster, AzureClusterSpec};
use crate::error::{Error, Result};

/// Desired state of one bastion host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BastionSpec {
    pub name: String,
    pub vnet_name: String,
    pub subnet_name: String,
    pub public_ip_name: String,
}

/// What the bastion workflows need to know about the cluster they act for
pub trait ClusterScope: Send + Sync {
    fn resource_group(&self) -> &str;
    fn location(&self) -> &str;
    fn cluster_name(&self) -> &str;

    /// User tags merged into the ownership tags of created resources
    fn additional_tags(&self) -> &BTreeMap<String, String>;

    /// Bastion hosts to reconcile, in processing order
    fn bastion_specs(&self) -> Vec<BastionSpec>;
}

/// [`ClusterScope`] built from an `AzureCluster` resource
#[derive(Clone, Debug)]
pub struct AzureClusterScope {
    cluster_name: String,
    spec: AzureClusterSpec,
}

impl AzureClusterScope {
    /// Default and validate the cluster's spec.
    pub fn new(cluster: &AzureCluster) -> Result<Self> {
        let spec = cluster.defaulted_spec();
        spec.validate().map_err(|errors| {
            Error::ValidationError(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;

        Ok(Self {
            cluster_name: cluster.cluster_name(),
            spec,
        })
    }

    pub fn subscription_id(&self) -> Option<&str> {
        self.spec.subscription_id.as_deref().filter(|s| !s.is_empty())
    }

    pub fn vnet_name(&self) -> &str {
        &self.spec.network_spec.vnet.name
    }
}

impl ClusterScope for AzureClusterScope {
    fn resource_group(&self) -> &str {
        &self.spec.resource_group
    }

    fn location(&self) -> &str {
        &self.spec.location
    }

    fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    fn additional_tags(&self) -> &BTreeMap<String, String> {
        &self.spec.additional_tags
    }

    fn bastion_specs(&self) -> Vec<BastionSpec> {
        self.spec
            .bastion_spec
            .azure_bastion
            .iter()
            .map(|bastion| BastionSpec {
                name: bastion.name.clone(),
                vnet_name: self.vnet_name().to_string(),
                subnet_name: bastion.subnet.name.clone(),
                public_ip_name: bastion.public_ip.name.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{AzureBastion, BastionConfig, SubnetSpec};

    fn azure_cluster(bastion: Option<AzureBastion>) -> AzureCluster {
        AzureCluster::new(
            "capz-1",
            AzureClusterSpec {
                resource_group: "capz-rg".to_string(),
                location: "westeurope".to_string(),
                subscription_id: Some("sub-1".to_string()),
                bastion_spec: BastionConfig {
                    azure_bastion: bastion,
                },
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_scope_exposes_defaulted_bastion_spec() {
        let scope = AzureClusterScope::new(&azure_cluster(Some(AzureBastion::default()))).unwrap();

        assert_eq!(scope.resource_group(), "capz-rg");
        assert_eq!(scope.location(), "westeurope");
        assert_eq!(scope.cluster_name(), "capz-1");
        assert_eq!(scope.subscription_id(), Some("sub-1"));
        assert_eq!(
            scope.bastion_specs(),
            vec![BastionSpec {
                name: "capz-1-azure-bastion".to_string(),
                vnet_name: "capz-1-vnet".to_string(),
                subnet_name: "AzureBastionSubnet".to_string(),
                public_ip_name: "capz-1-azure-bastion-pip".to_string(),
            }]
        );
    }

    #[test]
    fn test_no_bastion_means_no_specs() {
        let scope = AzureClusterScope::new(&azure_cluster(None)).unwrap();
        assert!(scope.bastion_specs().is_empty());
    }

    #[test]
    fn test_invalid_spec_is_rejected() {
        let bastion = AzureBastion {
            subnet: SubnetSpec {
                name: "default".to_string(),
                cidr_blocks: vec![],
            },
            ..Default::default()
        };
        let err = AzureClusterScope::new(&azure_cluster(Some(bastion))).unwrap_err();
        match err {
            Error::ValidationError(msg) => {
                assert!(msg.contains("spec.bastionSpec.azureBastion.subnet.name"))
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_resource_group_cannot_redirect_arm_paths() {
        let mut cluster = azure_cluster(Some(AzureBastion::default()));
        cluster.spec.resource_group =
            "rg1/providers/Microsoft.Network/bastionHosts/other?x=".to_string();

        let err = AzureClusterScope::new(&cluster).unwrap_err();
        assert!(matches!(err, Error::ValidationError(msg) if msg.contains("spec.resourceGroup")));
    }
}
