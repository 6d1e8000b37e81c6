//! Sompi wallet daemon.
//!
//! Loads a watch-only multisig keys file, follows a node over JSON-RPC, and
//! serves unsigned-transaction assembly to local clients.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sompi_core::params::Network;
use sompi_daemon::{DaemonConfig, RpcNodeClient, WalletServer, spawn_sync_loop, start_rpc_server};
use sompi_wallet::KeysFile;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "sompi-walletd",
    version,
    about = "Watch-only wallet daemon that assembles unsigned transactions"
)]
struct Args {
    /// Config file (TOML, JSON, or YAML by extension)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Network: mainnet, testnet, devnet, or simnet
    #[arg(long)]
    network: Option<Network>,

    /// Wallet RPC listen address
    #[arg(long)]
    listen: Option<String>,

    /// Node JSON-RPC endpoint URL
    #[arg(long)]
    node_rpc: Option<String>,

    /// Keys file path
    #[arg(long)]
    keys_file: Option<PathBuf>,

    /// Fee per selected input, in sompi
    #[arg(long)]
    fee_per_input: Option<u64>,

    /// Omit the change output when change is exactly zero
    #[arg(long)]
    omit_zero_change: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long)]
    log_format: Option<String>,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration.
    fn apply(self, mut config: DaemonConfig) -> DaemonConfig {
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(node_rpc) = self.node_rpc {
            config.node_rpc = node_rpc;
        }
        if self.keys_file.is_some() {
            config.keys_file = self.keys_file;
        }
        if let Some(fee) = self.fee_per_input {
            config.fee_per_input = fee;
        }
        if self.omit_zero_change {
            config.omit_zero_change = true;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = DaemonConfig::load(args.config.as_deref()).context("failed to load config")?;
    let config = args.apply(config);

    init_logging(&config.log_level, &config.log_format);

    info!("Sompi wallet daemon v{}", env!("CARGO_PKG_VERSION"));
    info!(network = %config.network, node = %config.node_rpc, "starting");

    let keys_path = config.keys_path();
    let keys = KeysFile::load(&keys_path)
        .with_context(|| format!("failed to load keys file {}", keys_path.display()))?;

    let params = config.network.params();
    let node = RpcNodeClient::new(&config.node_rpc, params.prefix(), config.request_timeout())
        .context("failed to create node client")?;
    let server = Arc::new(
        WalletServer::new(params, keys, Arc::new(node), config.assembly_options())
            .context("failed to open wallet")?,
    );

    // First sync happens before serving so early requests see a warm cache.
    if let Err(e) = server.sync_once().await {
        warn!(error = %e, "initial sync failed; will retry");
    }
    let sync_task = spawn_sync_loop(server.clone(), config.sync_interval());

    let (addr, rpc_handle) = start_rpc_server(&config.listen, server)
        .await
        .context("failed to start RPC server")?;
    info!(%addr, "wallet daemon running (Ctrl+C to stop)");

    tokio::signal::ctrl_c()
        .await
        .context("failed to install Ctrl+C handler")?;
    info!("received Ctrl+C, shutting down...");

    sync_task.abort();
    rpc_handle.stop().ok();
    rpc_handle.stopped().await;
    info!("wallet daemon shutdown complete");
    Ok(())
}

/// Initialize tracing with the given filter and output format.
///
/// `RUST_LOG` takes precedence over `level`. `format = "json"` emits
/// structured JSON; anything else is human-readable text.
fn init_logging(level: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "sompi-walletd",
            "--network",
            "testnet",
            "--fee-per-input",
            "500",
            "--omit-zero-change",
        ]);
        let config = args.apply(DaemonConfig::default());
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.fee_per_input, 500);
        assert!(config.omit_zero_change);
        assert_eq!(config.listen, DaemonConfig::default().listen);
    }

    #[test]
    fn absent_flags_keep_config() {
        let base = DaemonConfig {
            omit_zero_change: true,
            log_format: "json".into(),
            ..DaemonConfig::default()
        };
        let config = Args::parse_from(["sompi-walletd"]).apply(base.clone());
        assert_eq!(config, base);
    }

    #[test]
    fn unknown_network_rejected() {
        assert!(Args::try_parse_from(["sompi-walletd", "--network", "regtest"]).is_err());
    }
}
