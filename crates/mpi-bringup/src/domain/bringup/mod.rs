//! Worker/master bring-up.
//!
//! The main components are:
//! - [`ReadinessPoller`]: polls worker pods until the expected number run with an address
//! - [`build_hosts_config`]: turns discovered addresses into the hosts config artifact
//! - [`MasterTemplate`]: master workload rendered against the hosts config
//! - [`Orchestrator`]: sequences worker submission, polling, hosts config and master submission

pub mod address;
pub mod hosts_config;
pub mod master;
#[cfg(test)]
pub(crate) mod mock;
pub mod orchestrator;
pub mod poller;
pub mod traits;
pub mod types;
pub(crate) mod validation;

pub use address::resolve_local_address;
pub use hosts_config::build_hosts_config;
pub use hosts_config::render_hostsfile;
pub use master::MasterTemplate;
pub use orchestrator::Orchestrator;
pub use poller::ReadinessPoller;
pub use traits::AddressError;
pub use traits::AddressSource;
pub use traits::ClusterApi;
pub use traits::ClusterError;
pub use types::BringUpError;
pub use types::BringUpOutcome;
pub use types::BringUpStage;
pub use types::PollConfig;
pub use types::ReadinessRound;
