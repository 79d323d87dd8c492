//! Azure Resource Manager clients used by the bastion workflows
//!
//! Each resource type gets a narrow async trait (`SubnetsClient`,
//! `PublicIpsClient`, `BastionHostsClient`) so the workflows can be driven
//! by fakes in tests, plus an implementation on top of [`ArmClient`].

pub mod bastion_hosts;
pub mod client;
pub mod credentials;
pub mod error;
pub mod public_ips;
pub mod subnets;
pub mod tags;
pub mod types;

pub use bastion_hosts::{AzureBastionHostsClient, BastionHostsClient};
pub use client::{ArmClient, ArmSettings, DEFAULT_RESOURCE_MANAGER_ENDPOINT};
pub use credentials::{
    ClientSecretCredential, StaticTokenCredential, TokenCredential, DEFAULT_AUTHORITY_HOST,
};
pub use error::{resource_not_found, AzureError};
pub use public_ips::{AzurePublicIpsClient, PublicIpsClient};
pub use subnets::{AzureSubnetsClient, SubnetsClient};
pub use types::*;
