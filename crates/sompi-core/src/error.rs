//! Error types for core protocol values.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("missing ':' separator")] MissingSeparator,
    #[error("unknown prefix: {0}")] UnknownPrefix(String),
    #[error("wrong prefix: expected {expected}, got {got}")] WrongPrefix { expected: String, got: String },
    #[error("invalid length")] InvalidLength,
    #[error("invalid checksum")] InvalidChecksum,
    #[error("invalid character: {0}")] InvalidCharacter(char),
    #[error("invalid version: {0}")] InvalidVersion(u8),
    #[error("invalid padding bits")] InvalidPadding,
    #[error("mixed case")] MixedCase,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("transaction id must be 64 hex characters")] TransactionIdLength,
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("unknown network: {0}")] UnknownNetwork(String),
}
