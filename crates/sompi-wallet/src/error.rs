//! Wallet error types.

use sompi_core::constants::display_kaspa;
use sompi_core::error::AddressError;
use thiserror::Error;

/// Errors that can occur while assembling a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The wallet has not caught up with the network. Wait and retry.
    #[error("server is not synced")]
    NotSynced,

    /// Destination address could not be decoded for this network.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Requested amount is not acceptable.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Spendable outputs do not cover the spend plus fees.
    #[error(
        "insufficient funds for send: {} required, while only {} available",
        display_kaspa(.required),
        display_kaspa(.available)
    )]
    InsufficientFunds {
        /// Spend amount plus fees, in sompi.
        required: u64,
        /// Sum of the considered outputs, in sompi.
        available: u64,
    },

    /// The node follows a different network than the wallet.
    #[error("node is on network {reported}, wallet expects {expected}")]
    WrongNetwork { expected: String, reported: String },

    /// Remote node call failed (refresh, chain info, sync status).
    #[error("node: {0}")]
    Node(String),

    /// Transaction builder rejected the inputs or payments.
    #[error("build error: {0}")]
    Build(String),

    /// A cached UTXO pays to an address the wallet does not know.
    #[error("unknown wallet address: {0}")]
    UnknownAddress(String),

    /// No change address could be resolved.
    #[error("change address: {0}")]
    ChangeAddress(String),

    /// Keys file is missing fields or inconsistent.
    #[error("keys file: {0}")]
    KeysFile(String),

    /// Serialization error.
    #[error("serialization: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<AddressError> for WalletError {
    fn from(e: AddressError) -> Self {
        WalletError::InvalidAddress(e.to_string())
    }
}

impl From<std::io::Error> for WalletError {
    fn from(e: std::io::Error) -> Self {
        WalletError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_insufficient_funds_in_kaspa() {
        let e = WalletError::InsufficientFunds {
            required: 20_000,
            available: 5_000,
        };
        assert_eq!(
            e.to_string(),
            "insufficient funds for send: 0.00020000 KAS required, while only 0.00005000 KAS available"
        );
    }

    #[test]
    fn display_wrong_network() {
        let e = WalletError::WrongNetwork {
            expected: "mainnet".into(),
            reported: "kaspa-testnet-10".into(),
        };
        assert_eq!(
            e.to_string(),
            "node is on network kaspa-testnet-10, wallet expects mainnet"
        );
    }

    #[test]
    fn display_not_synced() {
        assert_eq!(WalletError::NotSynced.to_string(), "server is not synced");
    }

    #[test]
    fn from_address_error() {
        let e: WalletError = AddressError::InvalidChecksum.into();
        assert_eq!(e, WalletError::InvalidAddress("invalid checksum".into()));
    }

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: WalletError = io.into();
        assert_eq!(e, WalletError::Io("gone".into()));
    }

    #[test]
    fn clone_and_eq() {
        let e1 = WalletError::Node("timeout".into());
        assert_eq!(e1.clone(), e1);
    }
}
