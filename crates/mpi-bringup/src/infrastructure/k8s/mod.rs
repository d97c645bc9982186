//! Kubernetes integration module.
//!
//! - [`KubeCluster`]: the cluster platform backed by `kube::Api`
//! - [`convert`]: pure conversions between the bring-up model and Kubernetes objects

pub mod cluster;
pub mod convert;

pub use cluster::KubeCluster;
