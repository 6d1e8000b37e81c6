//! Spendability of a single UTXO under coinbase maturity rules.

use sompi_core::params::NetworkParams;
use sompi_core::types::UtxoRecord;

/// Chain position and maturity rule a selection is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaturityContext {
    /// Virtual DAA score from the DAG snapshot taken for this selection.
    pub virtual_daa_score: u64,
    pub coinbase_maturity: u64,
}

impl MaturityContext {
    pub fn new(virtual_daa_score: u64, params: &NetworkParams) -> Self {
        Self {
            virtual_daa_score,
            coinbase_maturity: params.coinbase_maturity,
        }
    }

    pub fn is_spendable(&self, utxo: &UtxoRecord) -> bool {
        is_spendable(utxo, self.virtual_daa_score, self.coinbase_maturity)
    }
}

/// Whether `utxo` may be spent at `current_daa_score`.
///
/// Non-coinbase outputs are always spendable. A coinbase output is spendable
/// once `current_daa_score - block_daa_score >= coinbase_maturity`; an output
/// from a block ahead of the current score is not yet mature.
pub fn is_spendable(utxo: &UtxoRecord, current_daa_score: u64, coinbase_maturity: u64) -> bool {
    if !utxo.entry.is_coinbase {
        return true;
    }
    current_daa_score
        .checked_sub(utxo.entry.block_daa_score)
        .is_some_and(|age| age >= coinbase_maturity)
}
