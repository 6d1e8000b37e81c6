//! Keys file and the wallet's address book.
//!
//! Key material and address derivation happen outside the daemon. The keys
//! file carries the cosigners' extended public keys, the multisig threshold,
//! and the addresses already derived for this wallet together with their
//! keychain position. The [`AddressBook`] answers the two questions selection
//! and assembly need: which derivation path owns a UTXO's address, and which
//! address receives change.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sompi_core::address::Address;
use sompi_core::params::NetworkParams;

use crate::error::WalletError;

/// Keychain branch of a derivation path.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(bincode::Encode, bincode::Decode)]
#[serde(rename_all = "lowercase")]
pub enum Keychain {
    /// Receive addresses handed out to payers.
    External,
    /// Change addresses used by the wallet itself.
    Internal,
}

impl Keychain {
    fn branch(&self) -> u32 {
        match self {
            Keychain::External => 0,
            Keychain::Internal => 1,
        }
    }
}

/// Derivation path `m/<keychain>/<index>` of a wallet address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(bincode::Encode, bincode::Decode)]
pub struct DerivationPath {
    pub keychain: Keychain,
    pub index: u32,
}

impl DerivationPath {
    pub fn new(keychain: Keychain, index: u32) -> Self {
        Self { keychain, index }
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m/{}/{}", self.keychain.branch(), self.index)
    }
}

/// A derived wallet address and its position in the keychain.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WalletAddress {
    pub address: Address,
    pub keychain: Keychain,
    pub index: u32,
}

/// On-disk wallet description (JSON).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct KeysFile {
    /// Cosigner extended public keys, in signing order.
    pub extended_public_keys: Vec<String>,
    /// Signatures required to spend.
    pub minimum_signatures: u32,
    #[serde(default)]
    pub last_used_external_index: u32,
    #[serde(default)]
    pub last_used_internal_index: u32,
    pub addresses: Vec<WalletAddress>,
}

impl KeysFile {
    /// Read and validate a keys file.
    pub fn load(path: &Path) -> Result<Self, WalletError> {
        let raw = std::fs::read_to_string(path)?;
        let keys: KeysFile =
            serde_json::from_str(&raw).map_err(|e| WalletError::KeysFile(e.to_string()))?;
        keys.validate()?;
        Ok(keys)
    }

    /// Write the keys file as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), WalletError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| WalletError::Serialization(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        if self.extended_public_keys.is_empty() {
            return Err(WalletError::KeysFile("no extended public keys".into()));
        }
        let cosigners = self.extended_public_keys.len() as u32;
        if self.minimum_signatures == 0 || self.minimum_signatures > cosigners {
            return Err(WalletError::KeysFile(format!(
                "minimum signatures {} out of range 1..={cosigners}",
                self.minimum_signatures
            )));
        }
        Ok(())
    }
}

/// Address → derivation path lookup for the wallet's own addresses.
#[derive(Debug, Clone)]
pub struct AddressBook {
    paths: HashMap<Address, DerivationPath>,
    change_index: u32,
}

impl AddressBook {
    /// Build the address book, rejecting addresses of another network and
    /// addresses listed twice.
    pub fn from_keys_file(keys: &KeysFile, params: &NetworkParams) -> Result<Self, WalletError> {
        let mut paths = HashMap::with_capacity(keys.addresses.len());
        for entry in &keys.addresses {
            if entry.address.network() != params.network {
                return Err(WalletError::KeysFile(format!(
                    "address {} is not a {} address",
                    entry.address, params.network
                )));
            }
            let path = DerivationPath::new(entry.keychain, entry.index);
            if paths.insert(entry.address.clone(), path).is_some() {
                return Err(WalletError::KeysFile(format!(
                    "duplicate address {}",
                    entry.address
                )));
            }
        }
        Ok(Self {
            paths,
            change_index: keys.last_used_internal_index,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.paths.contains_key(address)
    }

    /// Derivation path owning `address`.
    pub fn path_of(&self, address: &Address) -> Result<DerivationPath, WalletError> {
        self.paths
            .get(address)
            .copied()
            .ok_or_else(|| WalletError::UnknownAddress(address.to_string()))
    }

    /// All wallet addresses ordered by derivation path.
    pub fn addresses(&self) -> Vec<Address> {
        let mut entries: Vec<(&Address, &DerivationPath)> = self.paths.iter().collect();
        entries.sort_by_key(|(_, path)| **path);
        entries.into_iter().map(|(addr, _)| addr.clone()).collect()
    }

    /// Change address: the internal-keychain address at the last used
    /// internal index.
    pub fn change_address(&self) -> Result<Address, WalletError> {
        let wanted = DerivationPath::new(Keychain::Internal, self.change_index);
        self.paths
            .iter()
            .find(|(_, path)| **path == wanted)
            .map(|(addr, _)| addr.clone())
            .ok_or_else(|| {
                WalletError::ChangeAddress(format!("wallet holds no address at {wanted}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sompi_core::params::Network;

    fn addr(seed: u8) -> Address {
        Address::new(Network::Testnet, [seed; 32])
    }

    fn keys_file() -> KeysFile {
        KeysFile {
            extended_public_keys: vec!["kpubA".into(), "kpubB".into()],
            minimum_signatures: 2,
            last_used_external_index: 1,
            last_used_internal_index: 0,
            addresses: vec![
                WalletAddress { address: addr(1), keychain: Keychain::External, index: 0 },
                WalletAddress { address: addr(2), keychain: Keychain::External, index: 1 },
                WalletAddress { address: addr(3), keychain: Keychain::Internal, index: 0 },
            ],
        }
    }

    #[test]
    fn derivation_path_display() {
        assert_eq!(DerivationPath::new(Keychain::Internal, 7).to_string(), "m/1/7");
        assert_eq!(DerivationPath::new(Keychain::External, 0).to_string(), "m/0/0");
    }

    #[test]
    fn validate_threshold() {
        let mut keys = keys_file();
        assert!(keys.validate().is_ok());
        keys.minimum_signatures = 3;
        assert!(matches!(keys.validate(), Err(WalletError::KeysFile(_))));
        keys.minimum_signatures = 0;
        assert!(keys.validate().is_err());
        keys.extended_public_keys.clear();
        assert!(keys.validate().is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        let keys = keys_file();
        keys.save(&path).unwrap();
        assert_eq!(KeysFile::load(&path).unwrap(), keys);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = KeysFile::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, WalletError::Io(_)));
    }

    #[test]
    fn load_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(KeysFile::load(&path), Err(WalletError::KeysFile(_))));
    }

    #[test]
    fn address_book_paths() {
        let book = AddressBook::from_keys_file(&keys_file(), &Network::Testnet.params()).unwrap();
        assert_eq!(book.len(), 3);
        assert_eq!(book.path_of(&addr(2)).unwrap(), DerivationPath::new(Keychain::External, 1));
        assert!(matches!(book.path_of(&addr(9)), Err(WalletError::UnknownAddress(_))));
    }

    #[test]
    fn address_book_orders_by_path() {
        let book = AddressBook::from_keys_file(&keys_file(), &Network::Testnet.params()).unwrap();
        assert_eq!(book.addresses(), vec![addr(1), addr(2), addr(3)]);
    }

    #[test]
    fn change_address_is_internal_at_last_used_index() {
        let book = AddressBook::from_keys_file(&keys_file(), &Network::Testnet.params()).unwrap();
        assert_eq!(book.change_address().unwrap(), addr(3));
        // Deterministic across calls.
        assert_eq!(book.change_address().unwrap(), book.change_address().unwrap());
    }

    #[test]
    fn change_address_missing() {
        let mut keys = keys_file();
        keys.last_used_internal_index = 4;
        let book = AddressBook::from_keys_file(&keys, &Network::Testnet.params()).unwrap();
        assert!(matches!(book.change_address(), Err(WalletError::ChangeAddress(_))));
    }

    #[test]
    fn rejects_foreign_network_address() {
        let mut keys = keys_file();
        keys.addresses[0].address = Address::new(Network::Mainnet, [1; 32]);
        let err = AddressBook::from_keys_file(&keys, &Network::Testnet.params()).unwrap_err();
        assert!(matches!(err, WalletError::KeysFile(_)));
    }

    #[test]
    fn rejects_duplicate_address() {
        let mut keys = keys_file();
        keys.addresses[1].address = addr(1);
        assert!(AddressBook::from_keys_file(&keys, &Network::Testnet.params()).is_err());
    }
}
