//! Payments and unsigned transaction construction.
//!
//! The wallet never signs. It hands the selected inputs (with the derivation
//! path each cosigner needs) and the payments to a [`TransactionBuilder`],
//! which returns the serialized unsigned transaction passed back to the
//! caller unchanged.

use sompi_core::address::Address;
use sompi_core::types::OutPoint;

use crate::coin_selection::SelectionCandidate;
use crate::error::WalletError;
use crate::keys::DerivationPath;

/// Serialization format version of [`UnsignedTransaction`].
pub const UNSIGNED_TRANSACTION_VERSION: u16 = 1;

/// A payment instruction: destination and amount in sompi.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub address: Address,
    pub amount: u64,
}

/// Builds a serialized unsigned transaction from chosen inputs and payments.
pub trait TransactionBuilder: Send + Sync {
    fn build_unsigned_transaction(
        &self,
        extended_public_keys: &[String],
        minimum_signatures: u32,
        payments: &[Payment],
        inputs: &[SelectionCandidate],
    ) -> Result<Vec<u8>, WalletError>;
}

#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct UnsignedInput {
    pub outpoint: OutPoint,
    pub amount: u64,
    pub block_daa_score: u64,
    pub is_coinbase: bool,
    pub derivation_path: DerivationPath,
}

#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct UnsignedOutput {
    /// Encoded destination address.
    pub address: String,
    pub amount: u64,
}

/// Unsigned, partially-described transaction handed to cosigners.
#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct UnsignedTransaction {
    pub version: u16,
    pub extended_public_keys: Vec<String>,
    pub minimum_signatures: u32,
    pub inputs: Vec<UnsignedInput>,
    pub outputs: Vec<UnsignedOutput>,
}

impl UnsignedTransaction {
    /// Canonical bincode encoding.
    pub fn encode(&self) -> Result<Vec<u8>, WalletError> {
        bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| WalletError::Serialization(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, WalletError> {
        let (tx, _) = bincode::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| WalletError::Serialization(e.to_string()))?;
        Ok(tx)
    }

    /// Sum of input amounts minus sum of output amounts.
    pub fn fee(&self) -> Option<u64> {
        let inputs = self
            .inputs
            .iter()
            .try_fold(0u64, |acc, i| acc.checked_add(i.amount))?;
        let outputs = self
            .outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.amount))?;
        inputs.checked_sub(outputs)
    }
}

/// Default builder: validates and bincode-encodes an [`UnsignedTransaction`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsignedTransactionBuilder;

impl TransactionBuilder for UnsignedTransactionBuilder {
    fn build_unsigned_transaction(
        &self,
        extended_public_keys: &[String],
        minimum_signatures: u32,
        payments: &[Payment],
        inputs: &[SelectionCandidate],
    ) -> Result<Vec<u8>, WalletError> {
        if payments.is_empty() {
            return Err(WalletError::Build("no payments".into()));
        }
        if inputs.is_empty() {
            return Err(WalletError::Build("no inputs".into()));
        }
        let cosigners = extended_public_keys.len() as u32;
        if minimum_signatures == 0 || minimum_signatures > cosigners {
            return Err(WalletError::Build(format!(
                "minimum signatures {minimum_signatures} out of range 1..={cosigners}"
            )));
        }

        let tx = UnsignedTransaction {
            version: UNSIGNED_TRANSACTION_VERSION,
            extended_public_keys: extended_public_keys.to_vec(),
            minimum_signatures,
            inputs: inputs
                .iter()
                .map(|c| UnsignedInput {
                    outpoint: c.utxo.outpoint,
                    amount: c.utxo.entry.amount,
                    block_daa_score: c.utxo.entry.block_daa_score,
                    is_coinbase: c.utxo.entry.is_coinbase,
                    derivation_path: c.derivation_path,
                })
                .collect(),
            outputs: payments
                .iter()
                .map(|p| UnsignedOutput {
                    address: p.address.encode(),
                    amount: p.amount,
                })
                .collect(),
        };

        if tx.fee().is_none() {
            return Err(WalletError::Build("outputs exceed inputs".into()));
        }
        tx.encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keychain;
    use sompi_core::params::Network;
    use sompi_core::types::{TransactionId, UtxoEntry, UtxoRecord};

    fn candidate(seed: u8, amount: u64) -> SelectionCandidate {
        SelectionCandidate {
            utxo: UtxoRecord {
                outpoint: OutPoint {
                    transaction_id: TransactionId([seed; 32]),
                    index: u32::from(seed),
                },
                entry: UtxoEntry {
                    amount,
                    block_daa_score: 10,
                    is_coinbase: false,
                },
                address: Address::new(Network::Testnet, [seed; 32]),
            },
            derivation_path: DerivationPath::new(Keychain::External, u32::from(seed)),
        }
    }

    fn payment(seed: u8, amount: u64) -> Payment {
        Payment {
            address: Address::new(Network::Testnet, [seed; 32]),
            amount,
        }
    }

    fn xpubs() -> Vec<String> {
        vec!["kpubA".into(), "kpubB".into(), "kpubC".into()]
    }

    #[test]
    fn build_and_decode() {
        let bytes = UnsignedTransactionBuilder
            .build_unsigned_transaction(
                &xpubs(),
                2,
                &[payment(7, 10_000), payment(8, 30_000)],
                &[candidate(1, 50_000)],
            )
            .unwrap();
        let tx = UnsignedTransaction::decode(&bytes).unwrap();
        assert_eq!(tx.version, UNSIGNED_TRANSACTION_VERSION);
        assert_eq!(tx.minimum_signatures, 2);
        assert_eq!(tx.extended_public_keys, xpubs());
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.inputs[0].derivation_path.to_string(), "m/0/1");
        assert_eq!(tx.outputs[1].amount, 30_000);
        assert_eq!(tx.fee(), Some(10_000));
    }

    #[test]
    fn zero_amount_change_output_allowed() {
        let bytes = UnsignedTransactionBuilder
            .build_unsigned_transaction(
                &xpubs(),
                1,
                &[payment(7, 40_000), payment(8, 0)],
                &[candidate(1, 50_000)],
            )
            .unwrap();
        let tx = UnsignedTransaction::decode(&bytes).unwrap();
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[1].amount, 0);
    }

    #[test]
    fn rejects_overspend() {
        let err = UnsignedTransactionBuilder
            .build_unsigned_transaction(&xpubs(), 1, &[payment(7, 60_000)], &[candidate(1, 50_000)])
            .unwrap_err();
        assert_eq!(err, WalletError::Build("outputs exceed inputs".into()));
    }

    #[test]
    fn rejects_empty_inputs_and_payments() {
        let b = UnsignedTransactionBuilder;
        assert!(b.build_unsigned_transaction(&xpubs(), 1, &[], &[candidate(1, 1)]).is_err());
        assert!(b.build_unsigned_transaction(&xpubs(), 1, &[payment(1, 1)], &[]).is_err());
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        let b = UnsignedTransactionBuilder;
        let p = [payment(7, 1)];
        let i = [candidate(1, 10)];
        assert!(b.build_unsigned_transaction(&xpubs(), 0, &p, &i).is_err());
        assert!(b.build_unsigned_transaction(&xpubs(), 4, &p, &i).is_err());
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(matches!(
            UnsignedTransaction::decode(&[0xFF, 0xFF]),
            Err(WalletError::Serialization(_))
        ));
    }

    #[test]
    fn encoding_is_deterministic() {
        let build = || {
            UnsignedTransactionBuilder
                .build_unsigned_transaction(&xpubs(), 2, &[payment(7, 5)], &[candidate(1, 50)])
                .unwrap()
        };
        assert_eq!(build(), build());
    }
}
