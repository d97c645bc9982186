//! Test adapters implementing the platform and address traits

use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use api_types::ConfigArtifact;
use api_types::LabelSelector;
use api_types::PodObservation;
use api_types::PodPhase;
use api_types::ResourceHandle;
use api_types::WorkloadSpec;
use error_stack::Report;
use tokio_util::sync::CancellationToken;

use super::traits::AddressError;
use super::traits::AddressSource;
use super::traits::ClusterApi;
use super::traits::ClusterError;

pub fn running(name: &str, ip: &str) -> PodObservation {
    PodObservation::new(name, PodPhase::Running, Some(ip.parse().unwrap()))
}

pub fn pending(name: &str) -> PodObservation {
    PodObservation::new(name, PodPhase::Pending, None)
}

/// In-memory cluster replaying queued pod listings.
///
/// Once the queue is drained the last listing is repeated. Accepted create
/// calls are recorded in submission order.
#[derive(Default)]
pub struct ScriptedCluster {
    rounds: Mutex<VecDeque<Vec<PodObservation>>>,
    last_round: Mutex<Vec<PodObservation>>,
    list_calls: AtomicU32,
    fail_list_at: Option<u32>,
    fail_workload: Option<String>,
    fail_artifact: bool,
    cancel_after_listing: Option<CancellationToken>,
    cancel_after_artifact: Option<CancellationToken>,
    workloads: Mutex<Vec<WorkloadSpec>>,
    artifacts: Mutex<Vec<ConfigArtifact>>,
}

impl ScriptedCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_round(self, pods: Vec<PodObservation>) -> Self {
        self.rounds.lock().unwrap().push_back(pods);
        self
    }

    /// Fail the `call`-th listing (1-based)
    pub fn with_list_failure_at(mut self, call: u32) -> Self {
        self.fail_list_at = Some(call);
        self
    }

    pub fn with_workload_failure(mut self, name: &str) -> Self {
        self.fail_workload = Some(name.to_string());
        self
    }

    pub fn with_artifact_failure(mut self) -> Self {
        self.fail_artifact = true;
        self
    }

    /// Cancel `token` once a listing has been served
    pub fn cancelling_after_listing(mut self, token: CancellationToken) -> Self {
        self.cancel_after_listing = Some(token);
        self
    }

    /// Cancel `token` once a config artifact has been accepted
    pub fn cancelling_after_artifact(mut self, token: CancellationToken) -> Self {
        self.cancel_after_artifact = Some(token);
        self
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Workloads accepted so far, in submission order
    pub fn workloads(&self) -> Vec<WorkloadSpec> {
        self.workloads.lock().unwrap().clone()
    }

    pub fn artifacts(&self) -> Vec<ConfigArtifact> {
        self.artifacts.lock().unwrap().clone()
    }

    fn handle(kind: &str, name: &str, namespace: &str) -> ResourceHandle {
        ResourceHandle {
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: namespace.to_string(),
            uid: Some(format!("uid-{name}")),
        }
    }
}

#[async_trait::async_trait]
impl ClusterApi for ScriptedCluster {
    async fn create_workload(
        &self,
        spec: &WorkloadSpec,
    ) -> Result<ResourceHandle, Report<ClusterError>> {
        if self.fail_workload.as_deref() == Some(spec.name.as_str()) {
            return Err(Report::new(ClusterError::CreateFailed {
                kind: "Deployment",
                name: spec.name.clone(),
            }));
        }
        self.workloads.lock().unwrap().push(spec.clone());
        Ok(Self::handle("Deployment", &spec.name, &spec.namespace))
    }

    async fn list_pods(
        &self,
        _namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<PodObservation>, Report<ClusterError>> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_list_at == Some(call) {
            return Err(Report::new(ClusterError::ListFailed {
                selector: selector.to_string(),
            }));
        }
        let mut last = self.last_round.lock().unwrap();
        if let Some(next) = self.rounds.lock().unwrap().pop_front() {
            *last = next;
        }
        if let Some(token) = &self.cancel_after_listing {
            token.cancel();
        }
        Ok(last.clone())
    }

    async fn create_config_artifact(
        &self,
        artifact: &ConfigArtifact,
    ) -> Result<ResourceHandle, Report<ClusterError>> {
        if self.fail_artifact {
            return Err(Report::new(ClusterError::CreateFailed {
                kind: "ConfigMap",
                name: artifact.name.clone(),
            }));
        }
        self.artifacts.lock().unwrap().push(artifact.clone());
        if let Some(token) = &self.cancel_after_artifact {
            token.cancel();
        }
        Ok(Self::handle("ConfigMap", &artifact.name, &artifact.namespace))
    }
}

/// Fixed interface address list.
pub struct StaticAddresses {
    addresses: Option<Vec<IpAddr>>,
}

impl StaticAddresses {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            addresses: Some(
                addresses
                    .into_iter()
                    .map(|a| a.as_ref().parse().unwrap())
                    .collect(),
            ),
        }
    }

    pub fn failing() -> Self {
        Self { addresses: None }
    }
}

impl AddressSource for StaticAddresses {
    fn interface_addresses(&self) -> Result<Vec<IpAddr>, Report<AddressError>> {
        self.addresses
            .clone()
            .ok_or_else(|| Report::new(AddressError::EnumerationFailed))
    }
}
