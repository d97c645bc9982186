use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use mpi_bringup::bringup::Orchestrator;
use mpi_bringup::config::Cli;
use mpi_bringup::config::Commands;
use mpi_bringup::config::DescribeArgs;
use mpi_bringup::config::RunArgs;
use mpi_bringup::interfaces::SystemInterfaces;
use mpi_bringup::k8s::KubeCluster;
use mpi_bringup::kube_client;
use mpi_bringup::logging;
use mpi_bringup::manifest::decode_manifests;
use tokio_util::sync::CancellationToken;
use utils::version;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_global_hooks();

    let cli = Cli::parse();
    let _guard = logging::init();

    match cli.command {
        Commands::Run(run_args) => run_bring_up(*run_args).await,
        Commands::Describe(describe_args) => run_describe(describe_args).await,
    }
}

async fn run_bring_up(run_args: RunArgs) -> Result<()> {
    tracing::info!("Starting mpi-bringup {}", &**version::VERSION);

    let config = run_args.resolve_config().await?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e:?}"))?;

    let client = kube_client::init_kube_client(run_args.kubeconfig.clone())
        .await
        .map_err(|e| anyhow::anyhow!("{e:?}"))?;

    let cancellation_token = CancellationToken::new();
    let signal_token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, cancelling bring-up");
            signal_token.cancel();
        }
    });

    let orchestrator = Orchestrator::new(
        Arc::new(KubeCluster::new(client)),
        SystemInterfaces,
        config.poll.clone(),
    )
    .with_cancellation(cancellation_token);

    let outcome = orchestrator
        .bring_up(
            &config.worker_spec(),
            &config.master_template(),
            config.expected_count(),
        )
        .await
        .map_err(|e| anyhow::anyhow!("bring-up failed: {e:?}"))?;

    tracing::info!(
        worker = %outcome.worker,
        hosts_config = %outcome.hosts_config,
        master = %outcome.master,
        hosts = ?outcome.hosts,
        "bring-up complete"
    );
    Ok(())
}

async fn run_describe(describe_args: DescribeArgs) -> Result<()> {
    let yaml = tokio::fs::read_to_string(&describe_args.manifest)
        .await
        .with_context(|| format!("read manifest {:?}", describe_args.manifest))?;

    let objects = decode_manifests(&yaml).map_err(|e| anyhow::anyhow!("{e:?}"))?;
    for object in &objects {
        let name = object.name().unwrap_or("<unnamed>");
        if object.is_supported() {
            tracing::info!("{} {}", object.kind(), name);
        } else {
            tracing::warn!("Unsupported kind {} ({})", object.kind(), name);
        }
    }
    tracing::info!("{} objects in {:?}", objects.len(), describe_args.manifest);
    Ok(())
}
