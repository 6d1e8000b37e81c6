//! # sompi-wallet: UTXO selection and unsigned transaction assembly.
//!
//! Picks a subset of the wallet's unspent outputs that covers a spend plus a
//! per-input fee, computes change, and hands the chosen inputs and the
//! payments to a transaction builder.
//!
//! # Modules
//!
//! - [`error`]: `WalletError` enum
//! - [`maturity`]: coinbase maturity / spendability predicate
//! - [`fee`]: pluggable fee estimation
//! - [`coin_selection`]: order-preserving greedy selection
//! - [`utxo_cache`]: in-memory mirror of the wallet's UTXO set
//! - [`keys`]: keys file and address book (derivation paths, change address)
//! - [`builder`]: payments and the unsigned transaction builder

pub mod builder;
pub mod coin_selection;
pub mod error;
pub mod fee;
pub mod keys;
pub mod maturity;
pub mod utxo_cache;

pub use builder::{Payment, TransactionBuilder, UnsignedTransaction, UnsignedTransactionBuilder};
pub use coin_selection::{CoinSelection, CoinSelector, SelectionCandidate};
pub use error::WalletError;
pub use fee::{FeeEstimator, FixedFeePerInput};
pub use keys::{AddressBook, DerivationPath, KeysFile, Keychain, WalletAddress};
pub use maturity::{MaturityContext, is_spendable};
pub use utxo_cache::UtxoCache;
