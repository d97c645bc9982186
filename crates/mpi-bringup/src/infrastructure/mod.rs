pub mod interfaces;
pub mod k8s;
pub mod kube_client;
pub mod logging;
pub mod manifest;
