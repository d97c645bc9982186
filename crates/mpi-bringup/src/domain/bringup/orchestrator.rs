use api_types::WorkloadSpec;
use error_stack::Report;
use error_stack::ResultExt;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing::warn;

use super::address::resolve_local_address;
use super::hosts_config::build_hosts_config;
use super::master::MasterTemplate;
use super::poller::ReadinessPoller;
use super::traits::AddressSource;
use super::traits::ClusterApi;
use super::types::BringUpError;
use super::types::BringUpOutcome;
use super::types::BringUpStage;
use super::types::PollConfig;
use super::validation::ensure_dns_label;
use super::validation::ensure_not_empty;

/// Sequences a worker/master bring-up against a cluster.
///
/// The steps run strictly in order: worker workload, readiness polling, hosts
/// config, master workload. A failing step aborts the rest. Objects created by
/// earlier steps are left in place; there is no rollback.
pub struct Orchestrator<C, A> {
    cluster: C,
    address_source: A,
    poll_config: PollConfig,
    cancellation_token: CancellationToken,
}

impl<C: ClusterApi, A: AddressSource> Orchestrator<C, A> {
    pub fn new(cluster: C, address_source: A, poll_config: PollConfig) -> Self {
        Self {
            cluster,
            address_source,
            poll_config,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Token checked before every submission and at the top of every poll round.
    pub fn with_cancellation(mut self, cancellation_token: CancellationToken) -> Self {
        self.cancellation_token = cancellation_token;
        self
    }

    /// Runs one bring-up.
    ///
    /// # Errors
    ///
    /// - [`BringUpError::Validation`] before anything is submitted
    /// - [`BringUpError::Transport`] naming the stage whose API call failed
    /// - [`BringUpError::ReadinessTimeout`] when workers never reach `expected_count`
    /// - [`BringUpError::NoAddressFound`] when the master needs the local address and none exists
    /// - [`BringUpError::Cancelled`] when the token fires
    #[tracing::instrument(skip_all, fields(worker = %worker.name, master = %master.workload.name, expected_count = expected_count))]
    pub async fn bring_up(
        &self,
        worker: &WorkloadSpec,
        master: &MasterTemplate,
        expected_count: usize,
    ) -> Result<BringUpOutcome, Report<BringUpError>> {
        validate_request(worker, master, expected_count)?;

        self.enter(BringUpStage::SubmittingWorker)?;
        let worker_handle = self
            .cluster
            .create_workload(worker)
            .await
            .change_context(BringUpError::Transport {
                stage: BringUpStage::SubmittingWorker,
            })?;
        info!(workload = %worker_handle, "worker workload created");

        self.enter(BringUpStage::PollingReadiness)?;
        let hosts = ReadinessPoller::new(&self.cluster, self.poll_config.clone())
            .poll_until_ready(
                &worker.namespace,
                &worker.labels,
                expected_count,
                &self.cancellation_token,
            )
            .await
            .inspect_err(|_| {
                warn!(workload = %worker_handle, "worker workload left in place");
            })?;

        self.enter(BringUpStage::BuildingArtifact)?;
        let hosts_config = build_hosts_config(
            &master.config_name,
            &master.workload.namespace,
            &master.config_labels,
            &hosts,
        )?;

        self.enter(BringUpStage::SubmittingArtifact)?;
        let config_handle = self
            .cluster
            .create_config_artifact(&hosts_config)
            .await
            .change_context(BringUpError::Transport {
                stage: BringUpStage::SubmittingArtifact,
            })?;
        info!(config = %config_handle, hosts = hosts.len(), "hosts config created");

        self.enter(BringUpStage::SubmittingMaster)?;
        let local_ip = if master.needs_local_address() {
            let ip = resolve_local_address(&self.address_source)
                .change_context(BringUpError::NoAddressFound)?;
            info!(%ip, "resolved local address");
            Some(ip)
        } else {
            None
        };
        let master_spec = master.render(&hosts_config, expected_count, local_ip);
        let master_handle = self
            .cluster
            .create_workload(&master_spec)
            .await
            .change_context(BringUpError::Transport {
                stage: BringUpStage::SubmittingMaster,
            })?;
        info!(workload = %master_handle, "master workload created");

        Ok(BringUpOutcome {
            worker: worker_handle,
            hosts,
            hosts_config: config_handle,
            master: master_handle,
        })
    }

    fn enter(&self, stage: BringUpStage) -> Result<(), Report<BringUpError>> {
        if self.cancellation_token.is_cancelled() {
            return Err(Report::new(BringUpError::Cancelled { stage }));
        }
        info!("{stage}");
        Ok(())
    }
}

fn validate_request(
    worker: &WorkloadSpec,
    master: &MasterTemplate,
    expected_count: usize,
) -> Result<(), Report<BringUpError>> {
    ensure_dns_label("worker name", &worker.name)?;
    ensure_dns_label("worker namespace", &worker.namespace)?;
    ensure_not_empty("worker image", &worker.image)?;
    ensure_dns_label("master name", &master.workload.name)?;
    ensure_dns_label("master namespace", &master.workload.namespace)?;
    ensure_not_empty("master image", &master.workload.image)?;
    ensure_dns_label("config name", &master.config_name)?;
    if worker.labels.0.is_empty() {
        return Err(Report::new(BringUpError::validation(
            "worker labels",
            "a selector is required to find worker pods",
        )));
    }
    if expected_count == 0 {
        return Err(Report::new(BringUpError::validation(
            "expected count",
            "must be at least 1",
        )));
    }
    if usize::try_from(worker.replicas).ok() != Some(expected_count) {
        return Err(Report::new(BringUpError::validation(
            "expected count",
            format!(
                "{expected_count} does not match the {} requested worker replicas",
                worker.replicas
            ),
        )));
    }
    Ok(())
}
