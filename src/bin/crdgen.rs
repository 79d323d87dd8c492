use bastion_k8s::crd::AzureCluster;
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&AzureCluster::crd())?);
    Ok(())
}
