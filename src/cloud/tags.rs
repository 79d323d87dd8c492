//! Ownership tags attached to Azure resources managed for a cluster

use std::collections::BTreeMap;
use std::fmt;

/// Prefix shared by every tag key this provider writes.
pub const NAME_AZURE_PROVIDER_PREFIX: &str = "sigs.k8s.io_cluster-api-provider-azure_";

/// Prefix of the per-cluster ownership key; the cluster name is appended.
pub const NAME_AZURE_PROVIDER_OWNED: &str = "sigs.k8s.io_cluster-api-provider-azure_cluster_";

/// Key holding the resource's role within the cluster.
pub const NAME_AZURE_CLUSTER_API_ROLE: &str = "sigs.k8s.io_cluster-api-provider-azure_role";

/// Key holding the resource's human-readable name.
pub const NAME_TAG: &str = "Name";

/// Role value for bastion hosts.
pub const BASTION_ROLE: &str = "Bastion";

/// Whether a resource is owned by the cluster or shared with others
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResourceLifecycle {
    /// Created by the cluster and deleted with it
    #[default]
    Owned,
    /// Pre-existing or used by several clusters; never deleted
    Shared,
}

impl fmt::Display for ResourceLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLifecycle::Owned => write!(f, "owned"),
            ResourceLifecycle::Shared => write!(f, "shared"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BuildParams {
    pub cluster_name: String,
    pub lifecycle: ResourceLifecycle,
    pub name: Option<String>,
    pub role: Option<String>,
    /// User-supplied tags; keys written by the provider take precedence.
    pub additional: BTreeMap<String, String>,
}

/// The ownership tag key for a given cluster.
pub fn cluster_tag_key(cluster_name: &str) -> String {
    format!("{NAME_AZURE_PROVIDER_OWNED}{cluster_name}")
}

/// Build the tag map for a managed resource.
pub fn build_tags(params: BuildParams) -> BTreeMap<String, String> {
    let mut tags = params.additional;
    tags.insert(
        cluster_tag_key(&params.cluster_name),
        params.lifecycle.to_string(),
    );
    if let Some(role) = params.role {
        tags.insert(NAME_AZURE_CLUSTER_API_ROLE.to_string(), role);
    }
    if let Some(name) = params.name {
        tags.insert(NAME_TAG.to_string(), name);
    }
    tags
}
