//! # sompi-core
//! Foundation types shared by the Sompi wallet crates.
//!
//! - [`types`]: transaction IDs, outpoints, UTXO entries and records, DAG snapshots
//! - [`address`]: prefix-qualified Bech32m address codec
//! - [`params`]: per-network parameters (address prefix, coinbase maturity)
//! - [`constants`]: monetary units and defaults

pub mod address;
pub mod constants;
pub mod error;
pub mod params;
pub mod types;
