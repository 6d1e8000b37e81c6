//! UTXO and chain-snapshot types.
//!
//! All monetary values are in sompi (1 KAS = 10^8 sompi).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::address::Address;
use crate::error::ParseError;

/// A 32-byte transaction identifier.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct TransactionId(pub [u8; 32]);

impl TransactionId {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for TransactionId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(ParseError::TransactionIdLength);
        }
        let bytes = hex::decode(s).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ParseError::TransactionIdLength)?;
        Ok(Self(arr))
    }
}

/// Reference to a specific output of a previous transaction.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash,
    bincode::Encode, bincode::Decode,
)]
pub struct OutPoint {
    pub transaction_id: TransactionId,
    pub index: u32,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.index)
    }
}

/// The spendable value carried by an unspent output.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct UtxoEntry {
    /// Value in sompi.
    pub amount: u64,
    /// DAA score of the block that accepted the creating transaction.
    pub block_daa_score: u64,
    /// Whether the output was created by a coinbase transaction.
    pub is_coinbase: bool,
}

/// A UTXO owned by the wallet, as mirrored from the remote node.
///
/// Records are immutable once fetched. The wallet's cache replaces them
/// wholesale on every refresh.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UtxoRecord {
    pub outpoint: OutPoint,
    pub entry: UtxoEntry,
    /// Wallet address the output pays to.
    pub address: Address,
}

/// Snapshot of the remote node's DAG state.
///
/// Fetched fresh for every selection; never cached across calls.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DagInfo {
    /// Network name as reported by the node.
    pub network: String,
    pub virtual_daa_score: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Network;

    #[test]
    fn transaction_id_hex_roundtrip() {
        let id = TransactionId([0xAB; 32]);
        let s = id.to_string();
        assert_eq!(s, "ab".repeat(32));
        assert_eq!(s.parse::<TransactionId>().unwrap(), id);
    }

    #[test]
    fn transaction_id_wrong_length() {
        assert_eq!(
            "abcd".parse::<TransactionId>().unwrap_err(),
            ParseError::TransactionIdLength
        );
    }

    #[test]
    fn transaction_id_invalid_hex() {
        let err = "zz".repeat(32).parse::<TransactionId>().unwrap_err();
        assert!(matches!(err, ParseError::InvalidHex(_)));
    }

    #[test]
    fn outpoint_display() {
        let op = OutPoint {
            transaction_id: TransactionId::ZERO,
            index: 3,
        };
        assert_eq!(op.to_string(), format!("{}:3", "00".repeat(32)));
    }

    #[test]
    fn utxo_record_serde_json() {
        let record = UtxoRecord {
            outpoint: OutPoint {
                transaction_id: TransactionId([1; 32]),
                index: 0,
            },
            entry: UtxoEntry {
                amount: 50_000,
                block_daa_score: 7,
                is_coinbase: true,
            },
            address: Address::new(Network::Testnet, [2; 32]),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"amount\":50000"));
        assert!(json.contains("kaspatest:"));
        let back: UtxoRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn outpoint_bincode_encodes() {
        let op = OutPoint {
            transaction_id: TransactionId([9; 32]),
            index: 1,
        };
        let bytes = bincode::encode_to_vec(op, bincode::config::standard()).unwrap();
        let (back, _): (OutPoint, _) =
            bincode::decode_from_slice(&bytes, bincode::config::standard()).unwrap();
        assert_eq!(back, op);
    }
}
