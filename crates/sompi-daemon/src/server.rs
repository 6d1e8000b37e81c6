//! Transaction assembly over the wallet's shared state.
//!
//! [`WalletServer`] owns the UTXO cache and address book behind a single
//! async mutex. Every assembly request holds that lock from the UTXO refresh
//! through the builder call, so concurrent requests run one at a time and a
//! refresh never swaps the UTXO set under an in-progress selection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use sompi_core::address::Address;
use sompi_core::constants::DEFAULT_FEE_PER_INPUT;
use sompi_core::params::NetworkParams;
use sompi_core::types::DagInfo;
use sompi_wallet::{
    AddressBook, CoinSelector, FeeEstimator, FixedFeePerInput, KeysFile, MaturityContext, Payment,
    TransactionBuilder, UnsignedTransactionBuilder, UtxoCache, WalletError,
};

use crate::node_client::NodeClient;
use crate::sync::SyncState;

/// Knobs for how a selection becomes a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Flat fee per selected input, in sompi.
    pub fee_per_input: u64,
    /// Drop the change payment when change is exactly zero.
    pub omit_zero_change: bool,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            fee_per_input: DEFAULT_FEE_PER_INPUT,
            omit_zero_change: false,
        }
    }
}

/// Wallet balance split by spendability at the current DAA score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Sum of spendable outputs, in sompi.
    pub available: u64,
    /// Sum of coinbase outputs still maturing, in sompi.
    pub pending: u64,
}

/// State mutated under the wallet lock.
struct WalletState {
    utxos: UtxoCache,
    addresses: AddressBook,
}

pub struct WalletServer {
    params: NetworkParams,
    extended_public_keys: Vec<String>,
    minimum_signatures: u32,
    state: Mutex<WalletState>,
    node: Arc<dyn NodeClient>,
    builder: Arc<dyn TransactionBuilder>,
    fees: Arc<dyn FeeEstimator>,
    sync: SyncState,
    options: AssemblyOptions,
}

impl WalletServer {
    /// Create a server for `keys` on the network described by `params`.
    ///
    /// Starts unsynced with an empty UTXO cache. Fees default to
    /// [`FixedFeePerInput`] at `options.fee_per_input`; transactions are built
    /// by [`UnsignedTransactionBuilder`].
    pub fn new(
        params: NetworkParams,
        keys: KeysFile,
        node: Arc<dyn NodeClient>,
        options: AssemblyOptions,
    ) -> Result<Self, WalletError> {
        keys.validate()?;
        let addresses = AddressBook::from_keys_file(&keys, &params)?;
        info!(
            network = %params.network,
            addresses = addresses.len(),
            cosigners = keys.extended_public_keys.len(),
            minimum_signatures = keys.minimum_signatures,
            "wallet loaded"
        );
        Ok(Self {
            params,
            extended_public_keys: keys.extended_public_keys,
            minimum_signatures: keys.minimum_signatures,
            state: Mutex::new(WalletState {
                utxos: UtxoCache::new(),
                addresses,
            }),
            node,
            builder: Arc::new(UnsignedTransactionBuilder),
            fees: Arc::new(FixedFeePerInput(options.fee_per_input)),
            sync: SyncState::new(),
            options,
        })
    }

    pub fn with_builder(mut self, builder: Arc<dyn TransactionBuilder>) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_fee_estimator(mut self, fees: Arc<dyn FeeEstimator>) -> Self {
        self.fees = fees;
        self
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    pub fn sync_state(&self) -> &SyncState {
        &self.sync
    }

    /// Assemble an unsigned transaction paying `amount` sompi to `address`.
    ///
    /// The wallet lock is held for the whole call. The UTXO cache is
    /// refreshed first; DAG info is fetched fresh for the maturity check.
    /// Payments are `[recipient, change]`, with change going to the wallet's
    /// current internal address.
    pub async fn create_unsigned_transaction(
        &self,
        address: &str,
        amount: u64,
    ) -> Result<Vec<u8>, WalletError> {
        let mut state = self.state.lock().await;

        if !self.sync.is_synced() {
            return Err(WalletError::NotSynced);
        }

        self.refresh_locked(&mut state).await?;

        let recipient = Address::decode_with_prefix(address, self.params.prefix())?;
        if amount == 0 {
            return Err(WalletError::InvalidAmount(
                "amount must be greater than zero".into(),
            ));
        }

        let dag_info = self.dag_info().await?;
        let maturity = MaturityContext::new(dag_info.virtual_daa_score, &self.params);
        let selection = CoinSelector::select(
            state.utxos.records(),
            amount,
            self.fees.as_ref(),
            &maturity,
            &state.addresses,
        )?;

        let change_address = state.addresses.change_address()?;
        let mut payments = vec![Payment {
            address: recipient,
            amount,
        }];
        if selection.change > 0 || !self.options.omit_zero_change {
            payments.push(Payment {
                address: change_address,
                amount: selection.change,
            });
        }

        let transaction = self.builder.build_unsigned_transaction(
            &self.extended_public_keys,
            self.minimum_signatures,
            &payments,
            &selection.selected,
        )?;

        info!(
            recipient = %address,
            amount,
            inputs = selection.selected.len(),
            fee = selection.fee,
            change = selection.change,
            bytes = transaction.len(),
            "unsigned transaction created"
        );
        Ok(transaction)
    }

    /// Refresh the UTXO cache from the node.
    pub async fn refresh_utxos(&self) -> Result<(), WalletError> {
        let mut state = self.state.lock().await;
        self.refresh_locked(&mut state).await
    }

    /// Check the node, refresh the cache, and update the sync state.
    ///
    /// Any failure marks the wallet unsynced.
    pub async fn sync_once(&self) -> Result<(), WalletError> {
        let result = async {
            if !self.node.is_synced().await? {
                return Err(WalletError::NotSynced);
            }
            self.refresh_utxos().await
        }
        .await;

        match &result {
            Ok(()) => {
                if !self.sync.is_synced() {
                    info!("wallet synced");
                }
                self.sync.mark_synced();
            }
            Err(e) => self.sync.mark_unsynced(e.to_string()),
        }
        result
    }

    /// Balance of the cached UTXO set at the node's current DAA score.
    pub async fn get_balance(&self) -> Result<Balance, WalletError> {
        let state = self.state.lock().await;
        if !self.sync.is_synced() {
            return Err(WalletError::NotSynced);
        }

        let dag_info = self.dag_info().await?;
        let maturity = MaturityContext::new(dag_info.virtual_daa_score, &self.params);
        let balance = state
            .utxos
            .records()
            .iter()
            .fold(Balance::default(), |mut acc, utxo| {
                if maturity.is_spendable(utxo) {
                    acc.available = acc.available.saturating_add(utxo.entry.amount);
                } else {
                    acc.pending = acc.pending.saturating_add(utxo.entry.amount);
                }
                acc
            });
        Ok(balance)
    }

    /// Fresh DAG info, rejected if the node follows another network.
    async fn dag_info(&self) -> Result<DagInfo, WalletError> {
        let info = self.node.get_block_dag_info().await?;
        if !self.params.network.matches_node_network(&info.network) {
            warn!(
                expected = %self.params.network,
                reported = %info.network,
                "node network mismatch"
            );
            return Err(WalletError::WrongNetwork {
                expected: self.params.network.to_string(),
                reported: info.network,
            });
        }
        Ok(info)
    }

        /// Replace the cache with the node's view. On failure the previous
    /// snapshot stays in place.
    async fn refresh_locked(&self, state: &mut WalletState) -> Result<(), WalletError> {
        let addresses = state.addresses.addresses();
        let fetched = self.node.get_utxos_by_addresses(&addresses).await?;

        let total = fetched.len();
        let records: Vec<_> = fetched
            .into_iter()
            .filter(|r| state.addresses.contains(&r.address))
            .collect();
        if records.len() != total {
            warn!(
                ignored = total - records.len(),
                "node returned utxos for addresses outside the wallet"
            );
        }

        state.utxos.replace(records);
        debug!(
            utxos = state.utxos.len(),
            total = state.utxos.total_amount(),
            "utxo cache refreshed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sompi_core::params::Network;
    use sompi_core::types::{OutPoint, TransactionId, UtxoEntry, UtxoRecord};
    use sompi_wallet::{Keychain, UnsignedTransaction, WalletAddress};

    struct StaticNode {
        utxos: Vec<UtxoRecord>,
        daa_score: u64,
    }

    #[async_trait]
    impl NodeClient for StaticNode {
        async fn get_block_dag_info(&self) -> Result<DagInfo, WalletError> {
            Ok(DagInfo {
                network: "kaspa-testnet".into(),
                virtual_daa_score: self.daa_score,
            })
        }

        async fn get_utxos_by_addresses(
            &self,
            _addresses: &[Address],
        ) -> Result<Vec<UtxoRecord>, WalletError> {
            Ok(self.utxos.clone())
        }

        async fn is_synced(&self) -> Result<bool, WalletError> {
            Ok(true)
        }
    }

    fn address(seed: u8) -> Address {
        Address::new(Network::Testnet, [seed; 32])
    }

    fn keys() -> KeysFile {
        KeysFile {
            extended_public_keys: vec!["kpub-a".into()],
            minimum_signatures: 1,
            last_used_external_index: 0,
            last_used_internal_index: 0,
            addresses: vec![
                WalletAddress {
                    address: address(1),
                    keychain: Keychain::External,
                    index: 0,
                },
                WalletAddress {
                    address: address(2),
                    keychain: Keychain::Internal,
                    index: 0,
                },
            ],
        }
    }

    fn utxo(seed: u8, amount: u64, is_coinbase: bool) -> UtxoRecord {
        UtxoRecord {
            outpoint: OutPoint {
                transaction_id: TransactionId([seed; 32]),
                index: 0,
            },
            entry: UtxoEntry {
                amount,
                block_daa_score: 950,
                is_coinbase,
            },
            address: address(1),
        }
    }

    fn server(utxos: Vec<UtxoRecord>, options: AssemblyOptions) -> WalletServer {
        let node = Arc::new(StaticNode {
            utxos,
            daa_score: 1_000,
        });
        WalletServer::new(Network::Testnet.params(), keys(), node, options).unwrap()
    }

    #[tokio::test]
    async fn change_goes_to_internal_address() {
        let server = server(vec![utxo(9, 50_000, false)], AssemblyOptions::default());
        server.sync_once().await.unwrap();

        let bytes = server
            .create_unsigned_transaction(&address(7).encode(), 10_000)
            .await
            .unwrap();
        let tx = UnsignedTransaction::decode(&bytes).unwrap();
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[0].address, address(7).encode());
        assert_eq!(tx.outputs[0].amount, 10_000);
        assert_eq!(tx.outputs[1].address, address(2).encode());
        assert_eq!(tx.outputs[1].amount, 30_000);
        assert_eq!(tx.fee(), Some(10_000));
    }

    #[tokio::test]
    async fn zero_change_omitted_when_configured() {
        let options = AssemblyOptions {
            omit_zero_change: true,
            ..AssemblyOptions::default()
        };
        let server = server(vec![utxo(9, 20_000, false)], options);
        server.sync_once().await.unwrap();

        let bytes = server
            .create_unsigned_transaction(&address(7).encode(), 10_000)
            .await
            .unwrap();
        let tx = UnsignedTransaction::decode(&bytes).unwrap();
        assert_eq!(tx.outputs.len(), 1);
    }

    #[tokio::test]
    async fn zero_amount_rejected() {
        let server = server(vec![utxo(9, 20_000, false)], AssemblyOptions::default());
        server.sync_once().await.unwrap();
        let err = server
            .create_unsigned_transaction(&address(7).encode(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn balance_splits_immature_coinbase() {
        // DAA score 1000, outputs at 950: coinbase age 50 < maturity 100.
        let server = server(
            vec![utxo(1, 40_000, false), utxo(2, 70_000, true)],
            AssemblyOptions::default(),
        );
        server.sync_once().await.unwrap();
        let balance = server.get_balance().await.unwrap();
        assert_eq!(
            balance,
            Balance {
                available: 40_000,
                pending: 70_000,
            }
        );
    }

    #[tokio::test]
    async fn balance_requires_sync() {
        let server = server(vec![], AssemblyOptions::default());
        assert_eq!(server.get_balance().await, Err(WalletError::NotSynced));
    }

    #[tokio::test]
    async fn foreign_utxos_ignored_on_refresh() {
        let mut stray = utxo(3, 99_000, false);
        stray.address = address(0xEE);
        let server = server(vec![stray, utxo(4, 1_000, false)], AssemblyOptions::default());
        server.sync_once().await.unwrap();
        let balance = server.get_balance().await.unwrap();
        assert_eq!(balance.available, 1_000);
    }
}
