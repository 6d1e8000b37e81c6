//! Shared fixtures for property and end-to-end tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use sompi_core::address::Address;
use sompi_core::params::Network;
use sompi_core::types::{DagInfo, OutPoint, TransactionId, UtxoEntry, UtxoRecord};
use sompi_daemon::NodeClient;
use sompi_wallet::{KeysFile, Keychain, WalletAddress, WalletError};

pub const TEST_NETWORK: Network = Network::Testnet;

/// Deterministic wallet address for a derivation slot.
pub fn wallet_address(keychain: Keychain, index: u32) -> Address {
    let mut payload = [0u8; 32];
    payload[0] = match keychain {
        Keychain::External => 0xE0,
        Keychain::Internal => 0x10,
    };
    payload[1..5].copy_from_slice(&index.to_be_bytes());
    Address::new(TEST_NETWORK, payload)
}

/// Single-signer keys file with `external` receive and `internal` change
/// addresses. Change resolves to the last internal address.
pub fn test_keys(external: u32, internal: u32) -> KeysFile {
    let addresses = (0..external)
        .map(|i| (Keychain::External, i))
        .chain((0..internal).map(|i| (Keychain::Internal, i)))
        .map(|(keychain, index)| WalletAddress {
            address: wallet_address(keychain, index),
            keychain,
            index,
        })
        .collect();
    KeysFile {
        extended_public_keys: vec!["kpub-test".into()],
        minimum_signatures: 1,
        last_used_external_index: external.saturating_sub(1),
        last_used_internal_index: internal.saturating_sub(1),
        addresses,
    }
}

/// UTXO paying `address`, with an outpoint unique per `seed`.
pub fn utxo(
    seed: u32,
    amount: u64,
    block_daa_score: u64,
    is_coinbase: bool,
    address: Address,
) -> UtxoRecord {
    let mut id = [0u8; 32];
    id[..4].copy_from_slice(&seed.to_le_bytes());
    UtxoRecord {
        outpoint: OutPoint {
            transaction_id: TransactionId(id),
            index: seed,
        },
        entry: UtxoEntry {
            amount,
            block_daa_score,
            is_coinbase,
        },
        address,
    }
}

/// In-memory node whose UTXO set and DAA score the test controls.
#[derive(Default)]
pub struct ScriptedNode {
    utxos: Mutex<Vec<UtxoRecord>>,
    daa_score: AtomicU64,
    synced: AtomicBool,
}

impl ScriptedNode {
    pub fn new(utxos: Vec<UtxoRecord>, daa_score: u64) -> Self {
        Self {
            utxos: Mutex::new(utxos),
            daa_score: AtomicU64::new(daa_score),
            synced: AtomicBool::new(true),
        }
    }

    pub fn set_utxos(&self, utxos: Vec<UtxoRecord>) {
        *self.utxos.lock() = utxos;
    }

    pub fn set_daa_score(&self, score: u64) {
        self.daa_score.store(score, Ordering::SeqCst);
    }

    pub fn set_synced(&self, synced: bool) {
        self.synced.store(synced, Ordering::SeqCst);
    }
}

#[async_trait]
impl NodeClient for ScriptedNode {
    async fn get_block_dag_info(&self) -> Result<DagInfo, WalletError> {
        Ok(DagInfo {
            network: format!("kaspa-{TEST_NETWORK}"),
            virtual_daa_score: self.daa_score.load(Ordering::SeqCst),
        })
    }

    async fn get_utxos_by_addresses(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<UtxoRecord>, WalletError> {
        Ok(self
            .utxos
            .lock()
            .iter()
            .filter(|u| addresses.contains(&u.address))
            .cloned()
            .collect())
    }

    async fn is_synced(&self) -> Result<bool, WalletError> {
        Ok(self.synced.load(Ordering::SeqCst))
    }
}
