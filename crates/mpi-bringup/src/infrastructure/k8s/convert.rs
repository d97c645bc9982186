//! Translation between the bring-up data model and Kubernetes objects.

use api_types::ConfigArtifact;
use api_types::PodObservation;
use api_types::PodPhase;
use api_types::ResourceHandle;
use api_types::WorkloadSpec;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::apps::v1::DeploymentSpec;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::api::core::v1::ConfigMapVolumeSource;
use k8s_openapi::api::core::v1::Container;
use k8s_openapi::api::core::v1::ContainerPort;
use k8s_openapi::api::core::v1::KeyToPath;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::api::core::v1::PodSpec;
use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::api::core::v1::Volume;
use k8s_openapi::api::core::v1::VolumeMount;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector as K8sLabelSelector;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::warn;

/// Builds an `apps/v1` Deployment running `spec.replicas` copies of one container.
pub fn deployment_for(spec: &WorkloadSpec) -> Deployment {
    let labels = spec.labels.0.clone();

    let ports = spec
        .ports
        .iter()
        .map(|(name, port)| ContainerPort {
            name: Some(name.clone()),
            container_port: i32::from(*port),
            protocol: Some("TCP".to_string()),
            ..Default::default()
        })
        .collect::<Vec<_>>();

    let volume_mounts = spec
        .volumes
        .iter()
        .map(|volume| VolumeMount {
            name: volume.name.clone(),
            mount_path: volume.mount_path.clone(),
            sub_path: Some(volume.key.clone()),
            read_only: Some(false),
            ..Default::default()
        })
        .collect::<Vec<_>>();

    let volumes = spec
        .volumes
        .iter()
        .map(|volume| Volume {
            name: volume.name.clone(),
            config_map: Some(ConfigMapVolumeSource {
                name: Some(volume.config_name.clone()),
                items: Some(vec![KeyToPath {
                    key: volume.key.clone(),
                    path: volume.key.clone(),
                    mode: Some(volume.mode),
                }]),
                ..Default::default()
            }),
            ..Default::default()
        })
        .collect::<Vec<_>>();

    let container = Container {
        name: spec.name.clone(),
        image: Some(spec.image.clone()),
        command: non_empty(spec.command.clone()),
        args: non_empty(spec.args.clone()),
        ports: non_empty(ports),
        volume_mounts: non_empty(volume_mounts),
        ..Default::default()
    };

    Deployment {
        metadata: ObjectMeta {
            name: Some(spec.name.clone()),
            namespace: Some(spec.namespace.clone()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(i32::try_from(spec.replicas).unwrap_or(i32::MAX)),
            selector: K8sLabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    volumes: non_empty(volumes),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn config_map_for(artifact: &ConfigArtifact) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(artifact.name.clone()),
            namespace: Some(artifact.namespace.clone()),
            labels: Some(artifact.labels.clone()),
            ..Default::default()
        },
        data: Some(artifact.data.clone()),
        ..Default::default()
    }
}

/// Reduces a pod to what readiness polling looks at.
pub fn observe_pod(pod: &Pod) -> PodObservation {
    let name = pod
        .metadata
        .name
        .clone()
        .unwrap_or_else(|| "unknown".to_string());
    let status = pod.status.as_ref();

    let phase = status
        .and_then(|s| s.phase.as_deref())
        .map(PodPhase::from_phase_str)
        .unwrap_or(PodPhase::Unknown);

    let address = status
        .and_then(|s| s.pod_ip.as_deref())
        .filter(|ip| !ip.is_empty())
        .and_then(|ip| match ip.parse() {
            Ok(address) => Some(address),
            Err(e) => {
                warn!(pod = %name, ip, "ignoring unparsable pod IP: {e}");
                None
            }
        });

    PodObservation {
        name,
        phase,
        address,
    }
}

pub(crate) fn handle_from(kind: &str, metadata: &ObjectMeta, name: &str, namespace: &str) -> ResourceHandle {
    ResourceHandle {
        kind: kind.to_string(),
        name: metadata.name.clone().unwrap_or_else(|| name.to_string()),
        namespace: metadata
            .namespace
            .clone()
            .unwrap_or_else(|| namespace.to_string()),
        uid: metadata.uid.clone(),
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}
