//! Error types for the bastion reconciler

use thiserror::Error;

use crate::cloud::AzureError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to get subnet: {0}")]
    GetSubnet(#[source] AzureError),

    #[error("failed to create bastion publicIP: {0}")]
    CreatePublicIp(#[source] AzureError),

    #[error("failed to get created publicIP: {0}")]
    GetCreatedPublicIp(#[source] AzureError),

    #[error("failed to get existing publicIP: {0}")]
    GetExistingPublicIp(#[source] AzureError),

    #[error("cannot create bastion host: {0}")]
    CreateBastionHost(#[source] AzureError),

    #[error("failed to delete Bastion Host {name} in resource group {resource_group}: {source}")]
    DeleteBastionHost {
        name: String,
        resource_group: String,
        #[source]
        source: AzureError,
    },

    /// Azure errors outside the bastion workflows (client construction, auth)
    #[error("Azure error: {0}")]
    AzureError(#[from] AzureError),

    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// The Azure error underneath a workflow failure, if any.
    pub fn azure_source(&self) -> Option<&AzureError> {
        match self {
            Error::GetSubnet(e)
            | Error::CreatePublicIp(e)
            | Error::GetCreatedPublicIp(e)
            | Error::GetExistingPublicIp(e)
            | Error::CreateBastionHost(e)
            | Error::AzureError(e) => Some(e),
            Error::DeleteBastionHost { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
