//! Daemon startup and wiring errors.

use sompi_wallet::WalletError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("node client: {0}")]
    NodeClient(String),

    #[error("rpc server: {0}")]
    Rpc(String),
}
