//! bastion-k8s: Azure Bastion reconciliation for Cluster API clusters
//!
//! This crate provides the bastion host workflows of an Azure
//! infrastructure provider: ensuring a bastion host and its public IP exist
//! for an AzureCluster, and removing the bastion host again.

pub mod cloud;
pub mod config;
pub mod controller;
pub mod crd;
pub mod error;
pub mod telemetry;

pub use crate::error::{Error, Result};
