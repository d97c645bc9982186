pub mod config;
mod domain;
mod infrastructure;

// Re-export main modules
pub use domain::bringup;
pub use infrastructure::interfaces;
pub use infrastructure::k8s;
pub use infrastructure::kube_client;
pub use infrastructure::logging;
pub use infrastructure::manifest;
