//! Wallet daemon configuration.
//!
//! [`DaemonConfig`] is layered: built-in defaults, then an optional config
//! file (format inferred from its extension), then `SOMPI_WALLETD_*`
//! environment variables. Command-line flags are applied on top by the
//! binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use sompi_core::constants::{
    DEFAULT_FEE_PER_INPUT, DEFAULT_NODE_RPC_ENDPOINT, DEFAULT_WALLET_RPC_PORT,
};
use sompi_core::params::Network;

use crate::error::DaemonError;
use crate::server::AssemblyOptions;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "SOMPI_WALLETD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Network whose address prefix and maturity rule apply.
    pub network: Network,
    /// Socket address for the wallet JSON-RPC server.
    pub listen: String,
    /// URL of the node's JSON-RPC endpoint.
    pub node_rpc: String,
    /// Keys file path. Defaults to a per-network file under the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys_file: Option<PathBuf>,
    /// Flat fee charged per selected input, in sompi.
    pub fee_per_input: u64,
    /// Drop the change output when change is exactly zero.
    pub omit_zero_change: bool,
    pub sync_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Log filter directive (e.g. "info", "sompi_daemon=debug").
    pub log_level: String,
    /// "text" or "json".
    pub log_format: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            listen: format!("127.0.0.1:{DEFAULT_WALLET_RPC_PORT}"),
            node_rpc: DEFAULT_NODE_RPC_ENDPOINT.to_string(),
            keys_file: None,
            fee_per_input: DEFAULT_FEE_PER_INPUT,
            omit_zero_change: false,
            sync_interval_secs: 10,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from defaults, an optional file, and the environment.
    ///
    /// A `file` that is given but missing is an error.
    pub fn load(file: Option<&Path>) -> Result<Self, DaemonError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Resolved keys file path.
    pub fn keys_path(&self) -> PathBuf {
        match &self.keys_file {
            Some(path) => path.clone(),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("sompi")
                .join(self.network.to_string())
                .join("keys.json"),
        }
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            fee_per_input: self.fee_per_input,
            omit_zero_change: self.omit_zero_change,
        }
    }
}
