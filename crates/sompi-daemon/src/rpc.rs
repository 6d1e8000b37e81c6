//! JSON-RPC server for the wallet daemon.
//!
//! Exposes transaction assembly and balance queries over jsonrpsee 0.24.
//! Wallet errors map to stable numeric codes so clients can tell a retryable
//! "not synced" from a rejected request.

use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use sompi_core::constants::sompi_to_kaspa;
use sompi_wallet::WalletError;

use crate::error::DaemonError;
use crate::server::WalletServer;

/// Wallet is not synced; retry later.
pub const RPC_NOT_SYNCED: i32 = -28;
/// Generic wallet failure.
pub const RPC_WALLET_ERROR: i32 = -4;
/// Address or amount rejected.
pub const RPC_INVALID_PARAMETER: i32 = -5;
pub const RPC_INSUFFICIENT_FUNDS: i32 = -6;
/// The node could not be reached or answered badly.
pub const RPC_NODE_ERROR: i32 = -9;

/// `getbalance` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceJson {
    /// Spendable balance in sompi.
    pub available: u64,
    /// Maturing coinbase balance in sompi.
    pub pending: u64,
    /// Spendable balance in KAS.
    pub available_kas: f64,
}

/// Map a wallet error to a JSON-RPC error object.
pub fn wallet_error_to_rpc(err: &WalletError) -> ErrorObjectOwned {
    let code = match err {
        WalletError::NotSynced => RPC_NOT_SYNCED,
        WalletError::InvalidAddress(_) | WalletError::InvalidAmount(_) => RPC_INVALID_PARAMETER,
        WalletError::InsufficientFunds { .. } => RPC_INSUFFICIENT_FUNDS,
        WalletError::Node(_) | WalletError::WrongNetwork { .. } => RPC_NODE_ERROR,
        _ => RPC_WALLET_ERROR,
    };
    ErrorObjectOwned::owned(code, err.to_string(), None::<()>)
}

/// The wallet daemon JSON-RPC interface.
#[rpc(server)]
pub trait WalletRpc {
    /// Returns a hex-encoded unsigned transaction paying `amount` sompi to `address`.
    #[method(name = "createunsignedtransaction")]
    async fn create_unsigned_transaction(
        &self,
        address: String,
        amount: u64,
    ) -> Result<String, ErrorObjectOwned>;

    /// Returns the wallet balance at the node's current DAA score.
    #[method(name = "getbalance")]
    async fn get_balance(&self) -> Result<BalanceJson, ErrorObjectOwned>;
}

/// RPC handler backed by a [`WalletServer`].
pub struct WalletRpcImpl {
    server: Arc<WalletServer>,
}

impl WalletRpcImpl {
    pub fn new(server: Arc<WalletServer>) -> Self {
        Self { server }
    }
}

#[async_trait]
impl WalletRpcServer for WalletRpcImpl {
    async fn create_unsigned_transaction(
        &self,
        address: String,
        amount: u64,
    ) -> Result<String, ErrorObjectOwned> {
        self.server
            .create_unsigned_transaction(&address, amount)
            .await
            .map(hex::encode)
            .map_err(|e| wallet_error_to_rpc(&e))
    }

    async fn get_balance(&self) -> Result<BalanceJson, ErrorObjectOwned> {
        let balance = self
            .server
            .get_balance()
            .await
            .map_err(|e| wallet_error_to_rpc(&e))?;
        Ok(BalanceJson {
            available: balance.available,
            pending: balance.pending,
            available_kas: sompi_to_kaspa(balance.available),
        })
    }
}

/// Start the JSON-RPC server on `addr`.
///
/// Returns the bound address (useful with port 0) and a handle for shutdown.
pub async fn start_rpc_server(
    addr: &str,
    server: Arc<WalletServer>,
) -> Result<(SocketAddr, ServerHandle), DaemonError> {
    let rpc_server = Server::builder()
        .build(addr)
        .await
        .map_err(|e| DaemonError::Rpc(format!("bind {addr}: {e}")))?;
    let local_addr = rpc_server
        .local_addr()
        .map_err(|e| DaemonError::Rpc(e.to_string()))?;

    let handle = rpc_server.start(WalletRpcImpl::new(server).into_rpc());
    info!(%local_addr, "wallet RPC server listening");
    Ok((local_addr, handle))
}
