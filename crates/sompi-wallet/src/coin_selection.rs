//! Order-preserving greedy coin selection.
//!
//! Walks the wallet's UTXO set in cache order, skips outputs that are not yet
//! spendable, and accumulates until the running total covers the spend plus
//! the fee for the inputs chosen so far. The fee grows with every input, so
//! the target is recomputed on each step. Selection stops at the first
//! sufficient prefix; it does not minimize input count or change.

use sompi_core::types::UtxoRecord;
use tracing::debug;

use crate::error::WalletError;
use crate::fee::FeeEstimator;
use crate::keys::{AddressBook, DerivationPath};
use crate::maturity::MaturityContext;

/// A chosen UTXO together with the derivation path that can sign for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCandidate {
    pub utxo: UtxoRecord,
    pub derivation_path: DerivationPath,
}

impl SelectionCandidate {
    pub fn amount(&self) -> u64 {
        self.utxo.entry.amount
    }
}

/// Result of coin selection.
///
/// `total_value == spend_amount + fee + change` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSelection {
    /// Selected inputs, in cache order.
    pub selected: Vec<SelectionCandidate>,
    /// Sum of the selected amounts in sompi.
    pub total_value: u64,
    /// Fee for `selected.len()` inputs in sompi.
    pub fee: u64,
    /// Leftover returned to the wallet in sompi.
    pub change: u64,
}

pub struct CoinSelector;

impl CoinSelector {
    /// Select inputs covering `spend_amount` plus fees.
    ///
    /// # Arguments
    /// - `utxos`: the wallet's UTXO snapshot, in cache order
    /// - `spend_amount`: amount paid to the recipient in sompi
    /// - `fees`: fee for a given number of inputs
    /// - `maturity`: DAG snapshot score and coinbase maturity rule
    /// - `addresses`: resolves each chosen UTXO's derivation path
    ///
    /// Fails with [`WalletError::InsufficientFunds`] when every spendable
    /// output together does not cover the spend and its fees; an empty set
    /// reports zero available. A spend plus fee beyond `u64::MAX` can never
    /// be covered and reports `required: u64::MAX`.
    pub fn select(
        utxos: &[UtxoRecord],
        spend_amount: u64,
        fees: &dyn FeeEstimator,
        maturity: &MaturityContext,
        addresses: &AddressBook,
    ) -> Result<CoinSelection, WalletError> {
        let mut selected: Vec<SelectionCandidate> = Vec::new();
        let mut total_value: u64 = 0;

        for utxo in utxos {
            if !maturity.is_spendable(utxo) {
                continue;
            }

            selected.push(SelectionCandidate {
                utxo: utxo.clone(),
                derivation_path: addresses.path_of(&utxo.address)?,
            });
            total_value = total_value
                .checked_add(utxo.entry.amount)
                .ok_or_else(|| WalletError::Build("selected input total overflows u64".into()))?;

            // An unrepresentable target only grows with more inputs; keep
            // walking so the shortfall reports every spendable output.
            if target_for(spend_amount, fees, selected.len()).is_some_and(|t| total_value >= t) {
                break;
            }
        }

        let fee = fees.fee_for_input_count(selected.len());
        let (fee, target) = match (fee, target_for(spend_amount, fees, selected.len())) {
            (Some(fee), Some(target)) if total_value >= target => (fee, target),
            (_, target) => {
                let required = target.unwrap_or(u64::MAX);
                debug!(
                    required,
                    available = total_value,
                    considered = selected.len(),
                    "coin selection short of funds"
                );
                return Err(WalletError::InsufficientFunds {
                    required,
                    available: total_value,
                });
            }
        };

        let change = total_value - target;
        debug!(
            inputs = selected.len(),
            total_value,
            fee,
            change,
            "coin selection complete"
        );
        Ok(CoinSelection {
            selected,
            total_value,
            fee,
            change,
        })
    }
}

/// Spend plus the fee for `inputs` inputs, or `None` if it overflows.
fn target_for(spend_amount: u64, fees: &dyn FeeEstimator, inputs: usize) -> Option<u64> {
    fees.fee_for_input_count(inputs)
        .and_then(|fee| spend_amount.checked_add(fee))
}
