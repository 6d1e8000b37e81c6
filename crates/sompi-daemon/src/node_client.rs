//! Remote node access.
//!
//! [`NodeClient`] is the seam between the wallet daemon and the node it
//! follows. [`RpcNodeClient`] talks to a node over JSON-RPC; tests substitute
//! their own implementations.

use std::time::Duration;

use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use sompi_core::address::Address;
use sompi_core::types::{DagInfo, OutPoint, TransactionId, UtxoEntry, UtxoRecord};
use sompi_wallet::WalletError;

use crate::error::DaemonError;

/// Queries the wallet daemon needs from a node.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Current DAG state, including the virtual DAA score used for maturity.
    async fn get_block_dag_info(&self) -> Result<DagInfo, WalletError>;

    /// Every UTXO the node knows for `addresses`.
    async fn get_utxos_by_addresses(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<UtxoRecord>, WalletError>;

    /// Whether the node itself has caught up with the network.
    async fn is_synced(&self) -> Result<bool, WalletError>;
}

/// `getblockdaginfo` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DagInfoJson {
    pub network: String,
    pub virtual_daa_score: u64,
}

/// One entry of the `getutxosbyaddresses` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtxoJson {
    /// Bech32m address the output pays to.
    pub address: String,
    /// Funding transaction ID as hex.
    pub transaction_id: String,
    pub index: u32,
    /// Amount in sompi.
    pub amount: u64,
    pub block_daa_score: u64,
    pub is_coinbase: bool,
}

/// `getinfo` response. Only the sync flag is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfoJson {
    pub is_synced: bool,
    #[serde(default)]
    pub server_version: String,
}

impl UtxoJson {
    /// Convert into a [`UtxoRecord`], rejecting addresses outside `prefix`.
    pub fn into_record(self, prefix: &str) -> Result<UtxoRecord, WalletError> {
        let address = Address::decode_with_prefix(&self.address, prefix)
            .map_err(|e| WalletError::Node(format!("utxo address {}: {e}", self.address)))?;
        let transaction_id = self
            .transaction_id
            .parse::<TransactionId>()
            .map_err(|e| WalletError::Node(format!("utxo transaction id: {e}")))?;
        Ok(UtxoRecord {
            outpoint: OutPoint {
                transaction_id,
                index: self.index,
            },
            entry: UtxoEntry {
                amount: self.amount,
                block_daa_score: self.block_daa_score,
                is_coinbase: self.is_coinbase,
            },
            address,
        })
    }
}

/// JSON-RPC client for a node's HTTP endpoint.
pub struct RpcNodeClient {
    client: HttpClient,
    prefix: &'static str,
}

impl RpcNodeClient {
    /// Build a client for `endpoint`. Every request is bounded by `timeout`.
    pub fn new(
        endpoint: &str,
        prefix: &'static str,
        timeout: Duration,
    ) -> Result<Self, DaemonError> {
        let client = HttpClientBuilder::default()
            .request_timeout(timeout)
            .build(endpoint)
            .map_err(|e| DaemonError::NodeClient(format!("{endpoint}: {e}")))?;
        Ok(Self { client, prefix })
    }
}

fn node_error(method: &str, e: impl std::fmt::Display) -> WalletError {
    WalletError::Node(format!("{method}: {e}"))
}

#[async_trait]
impl NodeClient for RpcNodeClient {
    async fn get_block_dag_info(&self) -> Result<DagInfo, WalletError> {
        let info: DagInfoJson = self
            .client
            .request("getblockdaginfo", ArrayParams::new())
            .await
            .map_err(|e| node_error("getblockdaginfo", e))?;
        Ok(DagInfo {
            network: info.network,
            virtual_daa_score: info.virtual_daa_score,
        })
    }

    async fn get_utxos_by_addresses(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<UtxoRecord>, WalletError> {
        let encoded: Vec<String> = addresses.iter().map(Address::encode).collect();
        let mut params = ArrayParams::new();
        params
            .insert(encoded)
            .map_err(|e| node_error("getutxosbyaddresses", e))?;

        let entries: Vec<UtxoJson> = self
            .client
            .request("getutxosbyaddresses", params)
            .await
            .map_err(|e| node_error("getutxosbyaddresses", e))?;
        debug!(addresses = addresses.len(), utxos = entries.len(), "fetched utxos");

        entries
            .into_iter()
            .map(|entry| entry.into_record(self.prefix))
            .collect()
    }

    async fn is_synced(&self) -> Result<bool, WalletError> {
        let info: NodeInfoJson = self
            .client
            .request("getinfo", ArrayParams::new())
            .await
            .map_err(|e| node_error("getinfo", e))?;
        Ok(info.is_synced)
    }
}
