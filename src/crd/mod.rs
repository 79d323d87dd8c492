//! Custom Resource Definitions for bastion-k8s
//!
//! This module defines the AzureCluster CRD the bastion workflows are driven by.

mod azure_cluster;
pub mod network;


pub use azure_cluster::{
    is_valid_cidr, is_valid_resource_group_name, is_valid_resource_name, load_manifest,
    AzureCluster, AzureClusterSpec, SpecValidationError,
};
pub use network::{
    AzureBastion, BastionConfig, NetworkSpec, PublicIpSpec, SubnetSpec, VnetSpec,
    AZURE_BASTION_SUBNET_NAME, DEFAULT_AZURE_BASTION_SUBNET_CIDR,
};
