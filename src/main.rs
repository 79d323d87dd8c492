use std::path::PathBuf;
use std::sync::Arc;

use bastion_k8s::config::{AzureConfig, LogFormat};
use bastion_k8s::controller::{AzureClusterScope, BastionHostService, ClusterScope};
use bastion_k8s::crd::{load_manifest, AzureCluster};
use bastion_k8s::{telemetry, Error};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or update the bastion hosts of an AzureCluster
    Reconcile(PassArgs),
    /// Delete the bastion hosts of an AzureCluster
    Delete(PassArgs),
    /// Show version information
    Version,
}

#[derive(Parser, Debug)]
struct PassArgs {
    /// Read the AzureCluster from a YAML manifest instead of the cluster
    #[arg(long, short, conflicts_with = "name")]
    file: Option<PathBuf>,

    /// Name of the AzureCluster to fetch from Kubernetes
    #[arg(long, required_unless_present = "file")]
    name: Option<String>,

    /// Namespace of the AzureCluster
    #[arg(long, env = "OPERATOR_NAMESPACE", default_value = "default")]
    namespace: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t)]
    log_format: LogFormat,

    #[command(flatten)]
    azure: AzureConfig,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    match args.command {
        Commands::Version => {
            println!("bastion-k8s v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Reconcile(pass_args) => run_pass(pass_args, Pass::Reconcile).await,
        Commands::Delete(pass_args) => run_pass(pass_args, Pass::Delete).await,
    }
}

#[derive(Clone, Copy, Debug)]
enum Pass {
    Reconcile,
    Delete,
}

async fn load_cluster(args: &PassArgs) -> Result<AzureCluster, Error> {
    if let Some(path) = &args.file {
        return load_manifest(path);
    }

    let name = args
        .name
        .as_deref()
        .ok_or_else(|| Error::ConfigError("either --file or --name is required".to_string()))?;

    let client = kube::Client::try_default()
        .await
        .map_err(Error::KubeError)?;
    let api: kube::Api<AzureCluster> = kube::Api::namespaced(client, &args.namespace);
    api.get(name).await.map_err(Error::KubeError)
}

async fn run_pass(args: PassArgs, pass: Pass) -> Result<(), Error> {
    telemetry::init_tracing(args.log_format);

    let cluster = load_cluster(&args).await?;
    let scope = AzureClusterScope::new(&cluster)?;
    let arm = args.azure.arm_client(scope.subscription_id())?;

    info!(
        cluster = %scope.cluster_name(),
        resource_group = %scope.resource_group(),
        bastions = scope.bastion_specs().len(),
        ?pass,
        "Starting bastion pass"
    );

    let service = BastionHostService::with_arm_client(Arc::new(scope), arm);
    match pass {
        Pass::Reconcile => service.reconcile().await?,
        Pass::Delete => service.delete().await?,
    }

    info!(?pass, "Bastion pass complete");
    Ok(())
}
