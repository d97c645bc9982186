use std::net::IpAddr;

use api_types::LabelSelector;
use api_types::PodPhase;
use error_stack::Report;
use error_stack::ResultExt;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use super::traits::ClusterApi;
use super::types::BringUpError;
use super::types::BringUpStage;
use super::types::PollConfig;
use super::types::ReadinessRound;

fn is_running(phase: PodPhase) -> bool {
    phase == PodPhase::Running
}

/// Waits for a worker workload to reach its expected size.
///
/// Every round takes a fresh pod listing; addresses are never carried over
/// from a previous round.
pub struct ReadinessPoller<'a, C: ?Sized> {
    cluster: &'a C,
    config: PollConfig,
    is_ready_phase: fn(PodPhase) -> bool,
}

impl<'a, C: ClusterApi + ?Sized> ReadinessPoller<'a, C> {
    pub fn new(cluster: &'a C, config: PollConfig) -> Self {
        Self {
            cluster,
            config,
            is_ready_phase: is_running,
        }
    }

    /// Replaces the default `Running` phase check.
    pub fn with_phase_predicate(mut self, is_ready_phase: fn(PodPhase) -> bool) -> Self {
        self.is_ready_phase = is_ready_phase;
        self
    }

    /// Polls until exactly `expected` pods matching `selector` are ready and
    /// addressed, returning their addresses in listing order.
    ///
    /// # Errors
    ///
    /// - [`BringUpError::Transport`] as soon as a listing call fails, without retry
    /// - [`BringUpError::ReadinessTimeout`] once `max_rounds` rounds passed without success
    /// - [`BringUpError::Cancelled`] when the token fires before or between rounds
    #[tracing::instrument(skip(self, selector, cancellation_token), fields(selector = %selector))]
    pub async fn poll_until_ready(
        &self,
        namespace: &str,
        selector: &LabelSelector,
        expected: usize,
        cancellation_token: &CancellationToken,
    ) -> Result<Vec<IpAddr>, Report<BringUpError>> {
        const STAGE: BringUpStage = BringUpStage::PollingReadiness;

        if self.config.max_rounds == 0 {
            return Err(Report::new(BringUpError::validation(
                "maxRounds",
                "must be at least 1",
            )));
        }

        let mut last_round = ReadinessRound::default();
        for round in 1..=self.config.max_rounds {
            if cancellation_token.is_cancelled() {
                return Err(Report::new(BringUpError::Cancelled { stage: STAGE }));
            }

            let pods = self
                .cluster
                .list_pods(namespace, selector)
                .await
                .change_context(BringUpError::Transport { stage: STAGE })
                .attach_printable_lazy(|| format!("polling round {round}"))?;

            for pod in &pods {
                debug!(pod = %pod.name, phase = %pod.phase, address = ?pod.address, "observed pod");
            }

            last_round = ReadinessRound::evaluate(&pods, self.is_ready_phase);
            if last_round.is_complete(expected) {
                info!(round, hosts = last_round.addresses.len(), "workers ready");
                return Ok(last_round.addresses);
            }

            info!(
                round,
                max_rounds = self.config.max_rounds,
                observed = last_round.observed,
                ready = last_round.addresses.len(),
                expected,
                "workers not ready yet"
            );

            if round < self.config.max_rounds {
                select! {
                    _ = cancellation_token.cancelled() => {
                        return Err(Report::new(BringUpError::Cancelled { stage: STAGE }));
                    }
                    _ = tokio::time::sleep(self.config.round_delay()) => {}
                }
            }
        }

        Err(Report::new(BringUpError::ReadinessTimeout {
            rounds: self.config.max_rounds,
        })
        .attach_printable(format!(
            "last round observed {} pods, {} ready, expected {expected}",
            last_round.observed,
            last_round.addresses.len()
        )))
    }
}
