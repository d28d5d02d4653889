//! Build a forged withdrawal artifact from the live L1 and L2 chains.

use clap::Parser;
use eyre::WrapErr;
use forger::{
    config::Config,
    forge_withdrawal,
    metrics::{install_prometheus_recorder, Metrics},
    ForgeSettings,
};
use std::path::PathBuf;
use tracing::info;
use withdrawal::rpc::{RpcOutputSource, RpcWithdrawalSource};

#[derive(Parser)]
#[command(name = "forge-withdrawal")]
#[command(about = "Craft a forged withdrawal that reuses a real storage proof")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Where to write the artifact (overrides `output_path`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// L1 RPC url (overrides `l1_rpc_url`)
    #[arg(long, env = "L1_RPC_URL")]
    l1_rpc_url: Option<String>,

    /// L2 RPC url (overrides `l2_rpc_url`)
    #[arg(long, env = "L2_RPC_URL")]
    l2_rpc_url: Option<String>,

    /// Write a Prometheus text snapshot of the run's metrics to this file
    #[arg(long)]
    metrics_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_file(&cli.config)
        .wrap_err_with(|| format!("Failed to load config {}", cli.config.display()))?;

    if let Some(url) = cli.l1_rpc_url {
        config.l1_rpc_url = url;
    }
    if let Some(url) = cli.l2_rpc_url {
        config.l2_rpc_url = url;
    }
    if let Some(path) = cli.output {
        config.output_path = path;
    }
    config.validate().wrap_err("Invalid configuration")?;

    let network = config.network_config();

    info!("Loaded config:");
    info!("  Network: {:?}", config.network);
    info!("  L2OutputOracle: {}", network.l2_output_oracle);
    info!("  L2ToL1MessagePasser: {}", network.message_passer);
    info!("  Output: {}", config.output_path.display());

    let prometheus = cli
        .metrics_file
        .as_ref()
        .map(|_| install_prometheus_recorder())
        .transpose()?;
    let metrics = Metrics::new();

    info!("Connecting to L1...");
    let l1_provider = client::connect_checked(
        &config.l1_rpc_url,
        network.l1_chain_id,
        network.l2_output_oracle,
    )
    .await
    .wrap_err("Failed to connect to L1")?;

    info!("Connecting to L2...");
    let l2_provider = client::connect_checked(
        &config.l2_rpc_url,
        network.l2_chain_id,
        network.message_passer,
    )
    .await
    .wrap_err("Failed to connect to L2")?;

    let l1 = RpcOutputSource::new(l1_provider, network.l2_output_oracle);
    let l2 = RpcWithdrawalSource::new(l2_provider, network.message_passer);
    let settings = ForgeSettings::from_config(&config);

    let result = forge_withdrawal(&l1, &l2, &settings, &metrics, &mut rand::thread_rng()).await;

    if let (Some(handle), Some(path)) = (&prometheus, &cli.metrics_file) {
        tokio::fs::write(path, handle.render())
            .await
            .wrap_err_with(|| format!("Failed to write metrics to {}", path.display()))?;
        info!("Wrote metrics snapshot to {}", path.display());
    }

    let artifact = result?;
    artifact
        .write_json(&config.output_path)
        .wrap_err("Failed to write artifact")?;

    info!("Wrote forged withdrawal to {}", config.output_path.display());
    Ok(())
}
