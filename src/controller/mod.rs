//! Controller module for AzureCluster bastion reconciliation
//! This module contains the cluster scope and the bastion host workflows
//! a reconciliation loop drives for each AzureCluster.

pub mod bastion_hosts;
pub mod scope;

pub use bastion_hosts::{
    bastion_dns_name, bastion_ip_config_name, build_bastion_host, build_bastion_public_ip,
    BastionHostService,
};
pub use scope::{AzureClusterScope, BastionSpec, ClusterScope};
