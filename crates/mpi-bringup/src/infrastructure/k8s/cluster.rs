use api_types::ConfigArtifact;
use api_types::LabelSelector;
use api_types::PodObservation;
use api_types::ResourceHandle;
use api_types::WorkloadSpec;
use error_stack::Report;
use error_stack::ResultExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::api::PostParams;
use kube::Api;
use kube::Client;
use tracing::debug;

use super::convert::config_map_for;
use super::convert::deployment_for;
use super::convert::handle_from;
use super::convert::observe_pod;
use crate::domain::bringup::ClusterApi;
use crate::domain::bringup::ClusterError;

/// Cluster platform backed by the Kubernetes API.
///
/// Workloads are created as `apps/v1` Deployments and config artifacts as
/// ConfigMaps.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ClusterApi for KubeCluster {
    async fn create_workload(
        &self,
        spec: &WorkloadSpec,
    ) -> Result<ResourceHandle, Report<ClusterError>> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), &spec.namespace);
        let created = api
            .create(&PostParams::default(), &deployment_for(spec))
            .await
            .change_context(ClusterError::CreateFailed {
                kind: "Deployment",
                name: spec.name.clone(),
            })?;
        Ok(handle_from(
            "Deployment",
            &created.metadata,
            &spec.name,
            &spec.namespace,
        ))
    }

    async fn list_pods(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<PodObservation>, Report<ClusterError>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let selector = selector.to_string();
        let pods = api
            .list(&ListParams::default().labels(&selector))
            .await
            .change_context(ClusterError::ListFailed {
                selector: selector.clone(),
            })?;
        debug!(%selector, count = pods.items.len(), "listed pods");
        Ok(pods.items.iter().map(observe_pod).collect())
    }

    async fn create_config_artifact(
        &self,
        artifact: &ConfigArtifact,
    ) -> Result<ResourceHandle, Report<ClusterError>> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &artifact.namespace);
        let created = api
            .create(&PostParams::default(), &config_map_for(artifact))
            .await
            .change_context(ClusterError::CreateFailed {
                kind: "ConfigMap",
                name: artifact.name.clone(),
            })?;
        Ok(handle_from(
            "ConfigMap",
            &created.metadata,
            &artifact.name,
            &artifact.namespace,
        ))
    }
}
