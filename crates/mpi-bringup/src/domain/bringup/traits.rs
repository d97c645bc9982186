//! Seams between the bring-up core and the outside world

use core::error::Error;
use std::net::IpAddr;
use std::sync::Arc;

use api_types::ConfigArtifact;
use api_types::LabelSelector;
use api_types::PodObservation;
use api_types::ResourceHandle;
use api_types::WorkloadSpec;
use error_stack::Report;

/// Errors reported by a cluster platform.
#[derive(Debug, derive_more::Display)]
pub enum ClusterError {
    #[display("Failed to connect to cluster API")]
    ConnectionFailed,
    #[display("Failed to create {kind} {name}")]
    CreateFailed { kind: &'static str, name: String },
    #[display("Failed to list pods matching {selector}")]
    ListFailed { selector: String },
}

impl Error for ClusterError {}

/// Already-authenticated access to the orchestration platform.
#[async_trait::async_trait]
pub trait ClusterApi: Send + Sync {
    /// Submit a replicated workload
    async fn create_workload(
        &self,
        spec: &WorkloadSpec,
    ) -> Result<ResourceHandle, Report<ClusterError>>;

    /// List current pods matching `selector`, in the order the platform returns them
    async fn list_pods(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<PodObservation>, Report<ClusterError>>;

    /// Persist a config artifact
    async fn create_config_artifact(
        &self,
        artifact: &ConfigArtifact,
    ) -> Result<ResourceHandle, Report<ClusterError>>;
}

#[async_trait::async_trait]
impl<T: ClusterApi + ?Sized> ClusterApi for Arc<T> {
    async fn create_workload(
        &self,
        spec: &WorkloadSpec,
    ) -> Result<ResourceHandle, Report<ClusterError>> {
        self.as_ref().create_workload(spec).await
    }

    async fn list_pods(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<PodObservation>, Report<ClusterError>> {
        self.as_ref().list_pods(namespace, selector).await
    }

    async fn create_config_artifact(
        &self,
        artifact: &ConfigArtifact,
    ) -> Result<ResourceHandle, Report<ClusterError>> {
        self.as_ref().create_config_artifact(artifact).await
    }
}

/// Errors from local address discovery.
#[derive(Debug, derive_more::Display)]
pub enum AddressError {
    #[display("Failed to enumerate network interfaces")]
    EnumerationFailed,
    #[display("No non-loopback IPv4 address found")]
    NoAddressFound,
}

impl Error for AddressError {}

/// Source of the host's interface addresses.
pub trait AddressSource: Send + Sync {
    /// All configured interface addresses, in enumeration order
    fn interface_addresses(&self) -> Result<Vec<IpAddr>, Report<AddressError>>;
}

impl<T: AddressSource + ?Sized> AddressSource for Arc<T> {
    fn interface_addresses(&self) -> Result<Vec<IpAddr>, Report<AddressError>> {
        self.as_ref().interface_addresses()
    }
}
