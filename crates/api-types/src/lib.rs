//! Shared API type definitions
//!
//! This crate contains the data model exchanged between the bring-up core and
//! the platform adapters: workload requests, per-round pod observations and the
//! hosts config artifact handed to the master workload.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use serde::Deserialize;
use serde::Serialize;

/// Well-known key under which the hosts list is stored in a config artifact.
pub const HOSTSFILE_KEY: &str = "hostsfile";

/// Lifecycle phase of a pod as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Maps the platform's phase string, anything unrecognised is `Unknown`.
    pub fn from_phase_str(phase: &str) -> Self {
        match phase {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Snapshot of one pod taken during a readiness round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodObservation {
    /// Pod name
    pub name: String,
    /// Lifecycle phase
    pub phase: PodPhase,
    /// Assigned pod address, absent until the pod is scheduled
    pub address: Option<IpAddr>,
}

impl PodObservation {
    pub fn new(name: impl Into<String>, phase: PodPhase, address: Option<IpAddr>) -> Self {
        Self {
            name: name.into(),
            phase,
            address,
        }
    }
}

/// Equality-based label selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelector(pub BTreeMap<String, String>);

impl LabelSelector {
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self(BTreeMap::from([(key.into(), value.into())]))
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// A file projected into a container from a config artifact key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigVolume {
    /// Volume name inside the pod
    pub name: String,
    /// Name of the config artifact backing the volume
    pub config_name: String,
    /// Artifact key projected as a file
    pub key: String,
    /// File mode of the projected file
    pub mode: i32,
    /// Absolute path of the mounted file inside the container
    pub mount_path: String,
}

/// Request for a set of replicated containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSpec {
    /// Workload name
    pub name: String,
    /// Target namespace
    pub namespace: String,
    /// Labels applied to the workload and its pods, also used as selector
    pub labels: LabelSelector,
    /// Desired replica count
    pub replicas: u32,
    /// Container image
    pub image: String,
    /// Container entrypoint override
    pub command: Vec<String>,
    /// Container arguments
    pub args: Vec<String>,
    /// Exposed TCP ports as `(name, port)`
    pub ports: Vec<(String, u16)>,
    /// Config-backed file mounts
    pub volumes: Vec<ConfigVolume>,
}

/// Named key-value resource passed to dependent workloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigArtifact {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub data: BTreeMap<String, String>,
}

impl ConfigArtifact {
    /// Contents of the hosts file, if this artifact carries one.
    pub fn hostsfile(&self) -> Option<&str> {
        self.data.get(HOSTSFILE_KEY).map(String::as_str)
    }
}

/// Reference to an object accepted by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    /// Object kind, e.g. `Deployment`
    pub kind: String,
    pub name: String,
    pub namespace: String,
    /// Platform-assigned identifier, when the platform reports one
    pub uid: Option<String>,
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} in {}", self.kind, self.name, self.namespace)
    }
}
