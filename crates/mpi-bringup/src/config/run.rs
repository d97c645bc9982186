use std::path::PathBuf;

use clap::Parser;

use crate::config::bringup::BringUpConfig;

#[derive(Parser, Clone, Debug, Default)]
pub struct RunArgs {
    #[arg(
        long,
        env = "KUBECONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "Path to kubeconfig file (defaults to cluster config or ~/.kube/config)"
    )]
    pub kubeconfig: Option<PathBuf>,

    #[arg(
        long,
        env = "MPI_BRINGUP_CONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "YAML file with bring-up settings, flags below override it"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, env = "MPI_BRINGUP_NAMESPACE", help = "Namespace for all created objects")]
    pub namespace: Option<String>,

    #[arg(
        long,
        env = "MPI_BRINGUP_REPLICAS",
        help = "Number of worker replicas to request and wait for"
    )]
    pub replicas: Option<u32>,

    #[arg(long, env = "MPI_BRINGUP_WORKER_IMAGE", help = "Worker container image")]
    pub worker_image: Option<String>,

    #[arg(long, env = "MPI_BRINGUP_MASTER_IMAGE", help = "Master container image")]
    pub master_image: Option<String>,

    #[arg(
        long,
        env = "MPI_BRINGUP_LABEL_KEY",
        help = "Label key used to select the pods of each workload"
    )]
    pub label_key: Option<String>,

    #[arg(
        long,
        env = "MPI_BRINGUP_MAX_POLL_ROUNDS",
        help = "Readiness polling rounds before giving up"
    )]
    pub max_poll_rounds: Option<u32>,

    #[arg(
        long,
        env = "MPI_BRINGUP_POLL_INTERVAL_MS",
        help = "Delay between readiness polling rounds in milliseconds"
    )]
    pub poll_interval_ms: Option<u64>,
}

impl RunArgs {
    /// Defaults, then the config file, then flags.
    pub async fn resolve_config(&self) -> anyhow::Result<BringUpConfig> {
        let mut config = match &self.config {
            Some(path) => BringUpConfig::load(path).await?,
            None => BringUpConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut BringUpConfig) {
        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(replicas) = self.replicas {
            config.replica_count = replicas;
        }
        if let Some(image) = &self.worker_image {
            config.worker_image = image.clone();
        }
        if let Some(image) = &self.master_image {
            config.master_image = image.clone();
        }
        if let Some(label_key) = &self.label_key {
            config.label_key = label_key.clone();
        }
        if let Some(max_rounds) = self.max_poll_rounds {
            config.poll.max_rounds = max_rounds;
        }
        if let Some(interval) = self.poll_interval_ms {
            config.poll.round_delay_ms = interval;
        }
    }
}

#[derive(Parser, Clone, Debug)]
pub struct DescribeArgs {
    #[arg(value_hint = clap::ValueHint::FilePath, help = "Multi-document YAML manifest")]
    pub manifest: PathBuf,
}
