use std::path::Path;
use std::path::PathBuf;

use error_stack::Report;
use error_stack::ResultExt;
use kube::config::KubeConfigOptions;
use kube::config::Kubeconfig;
use kube::Client;
use kube::Config;
use tracing::info;

use crate::domain::bringup::ClusterError;

/// Client for the cluster the bring-up targets.
///
/// An explicit kubeconfig wins, otherwise the in-cluster environment and then
/// `~/.kube/config` are tried.
pub async fn init_kube_client(kubeconfig: Option<PathBuf>) -> Result<Client, Report<ClusterError>> {
    let config = match kubeconfig {
        Some(path) => config_from_file(&path).await?,
        None => Config::infer()
            .await
            .change_context(ClusterError::ConnectionFailed)
            .attach_printable("no kubeconfig given, in-cluster and default locations failed")?,
    };
    info!(
        cluster_url = %config.cluster_url,
        default_namespace = %config.default_namespace,
        "kubernetes config loaded"
    );
    Client::try_from(config).change_context(ClusterError::ConnectionFailed)
}

async fn config_from_file(path: &Path) -> Result<Config, Report<ClusterError>> {
    let kubeconfig = Kubeconfig::read_from(path)
        .change_context(ClusterError::ConnectionFailed)
        .attach_printable_lazy(|| format!("unreadable kubeconfig {}", path.display()))?;
    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .change_context(ClusterError::ConnectionFailed)
        .attach_printable_lazy(|| format!("unusable kubeconfig {}", path.display()))
}
