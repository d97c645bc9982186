use core::error::Error;
use std::net::IpAddr;
use std::time::Duration;

use api_types::PodObservation;
use api_types::PodPhase;
use api_types::ResourceHandle;
use serde::Deserialize;
use serde::Serialize;

/// Steps of a bring-up, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BringUpStage {
    #[display("submitting worker workload")]
    SubmittingWorker,
    #[display("polling worker readiness")]
    PollingReadiness,
    #[display("building hosts config")]
    BuildingArtifact,
    #[display("submitting hosts config")]
    SubmittingArtifact,
    #[display("submitting master workload")]
    SubmittingMaster,
}

/// Errors that abort a bring-up.
///
/// The report carrying one of these keeps the originating platform or address
/// error underneath, so the root cause is printed together with the stage.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum BringUpError {
    #[display("Cluster API call failed while {stage}")]
    Transport { stage: BringUpStage },
    #[display("Workers not ready after {rounds} polling rounds")]
    ReadinessTimeout { rounds: u32 },
    #[display("No non-loopback IPv4 address found on this host")]
    NoAddressFound,
    #[display("Invalid {field}: {message}")]
    Validation { field: String, message: String },
    #[display("Bring-up cancelled while {stage}")]
    Cancelled { stage: BringUpStage },
}

impl Error for BringUpError {}

impl BringUpError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Bounds of the readiness polling loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollConfig {
    /// Maximum number of list rounds before giving up
    pub max_rounds: u32,
    /// Delay between two rounds in milliseconds
    pub round_delay_ms: u64,
}

impl PollConfig {
    pub fn new(max_rounds: u32, round_delay: Duration) -> Self {
        Self {
            max_rounds,
            round_delay_ms: u64::try_from(round_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn round_delay(&self) -> Duration {
        Duration::from_millis(self.round_delay_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_rounds: 100,
            round_delay_ms: 3000,
        }
    }
}

/// Verdict of a single polling round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadinessRound {
    /// Addresses collected in this round, in listing order
    pub addresses: Vec<IpAddr>,
    /// Whether every scanned pod satisfied the readiness predicate
    pub all_ready: bool,
    /// Number of pods the platform returned
    pub observed: usize,
}

impl ReadinessRound {
    /// Scans `observations` in order and stops at the first pod that is not
    /// in a ready phase or has no address yet.
    pub fn evaluate(observations: &[PodObservation], is_ready_phase: fn(PodPhase) -> bool) -> Self {
        let mut addresses = Vec::with_capacity(observations.len());
        for pod in observations {
            match pod.address {
                Some(address) if is_ready_phase(pod.phase) => addresses.push(address),
                _ => {
                    return Self {
                        addresses,
                        all_ready: false,
                        observed: observations.len(),
                    };
                }
            }
        }
        Self {
            addresses,
            all_ready: true,
            observed: observations.len(),
        }
    }

    /// Terminal success requires every pod ready and exactly `expected` addresses.
    pub fn is_complete(&self, expected: usize) -> bool {
        self.all_ready && self.addresses.len() == expected
    }
}

/// Objects created by a successful bring-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BringUpOutcome {
    pub worker: ResourceHandle,
    /// Worker addresses in the order written to the hosts file
    pub hosts: Vec<IpAddr>,
    pub hosts_config: ResourceHandle,
    pub master: ResourceHandle,
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    fn running(name: &str, ip: &str) -> PodObservation {
        PodObservation::new(name, PodPhase::Running, Some(ip.parse().unwrap()))
    }

    fn is_running(phase: PodPhase) -> bool {
        phase == PodPhase::Running
    }

    #[test]
    fn evaluate_stops_at_first_unready_pod() {
        let pods = vec![
            running("w-0", "10.0.0.5"),
            PodObservation::new("w-1", PodPhase::Pending, None),
            running("w-2", "10.0.0.7"),
        ];

        let round = ReadinessRound::evaluate(&pods, is_running);

        assert!(!round.all_ready);
        assert_eq!(round.addresses, vec!["10.0.0.5".parse::<IpAddr>().unwrap()]);
        assert_eq!(round.observed, 3);
        assert!(!round.is_complete(3));
    }

    #[test]
    fn running_pod_without_address_is_not_ready() {
        let pods = vec![PodObservation::new("w-0", PodPhase::Running, None)];

        let round = ReadinessRound::evaluate(&pods, is_running);

        assert!(!round.all_ready);
        assert!(round.addresses.is_empty());
    }

    #[test]
    fn addressed_pod_in_wrong_phase_is_not_ready() {
        let pods = vec![PodObservation::new(
            "w-0",
            PodPhase::Succeeded,
            Some("10.0.0.5".parse().unwrap()),
        )];

        assert!(!ReadinessRound::evaluate(&pods, is_running).all_ready);
    }

    #[test]
    fn completion_requires_exact_count() {
        let pods = vec![
            running("w-0", "10.0.0.5"),
            running("w-1", "10.0.0.6"),
            running("w-2", "10.0.0.7"),
        ];

        let round = ReadinessRound::evaluate(&pods, is_running);

        assert!(round.all_ready);
        assert!(round.is_complete(3));
        assert!(!round.is_complete(2));
        assert!(!round.is_complete(4));
    }

    #[test]
    fn empty_listing_never_completes() {
        let round = ReadinessRound::evaluate(&[], is_running);
        assert!(!round.is_complete(2));
    }

    #[test]
    fn poll_config_round_trips_delay() {
        let config = PollConfig::new(7, Duration::from_millis(250));
        assert_eq!(config.max_rounds, 7);
        assert_eq!(config.round_delay(), Duration::from_millis(250));
    }

    #[test]
    fn poll_config_defaults_fill_missing_fields() {
        let config: PollConfig = serde_yaml::from_str("maxRounds: 5").unwrap();
        assert_eq!(config.max_rounds, 5);
        assert_eq!(config.round_delay_ms, 3000);
    }
}
