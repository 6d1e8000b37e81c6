//! Per-network parameters consumed by the wallet.
//!
//! Only the values the wallet needs are carried here: the address prefix the
//! daemon decodes destinations against, and the coinbase maturity used by the
//! spendability check.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::DEFAULT_COINBASE_MATURITY;
use crate::error::ParseError;

/// Network the wallet operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network (prefix `kaspa`).
    #[default]
    Mainnet,
    /// Public test network (prefix `kaspatest`).
    Testnet,
    /// Developer network (prefix `kaspadev`).
    Devnet,
    /// Local simulation network (prefix `kaspasim`).
    Simnet,
}

impl Network {
    /// Address prefix for this network.
    pub fn prefix(&self) -> &'static str {
        match self {
            Network::Mainnet => "kaspa",
            Network::Testnet => "kaspatest",
            Network::Devnet => "kaspadev",
            Network::Simnet => "kaspasim",
        }
    }

    /// Look up a network from its address prefix.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "kaspa" => Some(Network::Mainnet),
            "kaspatest" => Some(Network::Testnet),
            "kaspadev" => Some(Network::Devnet),
            "kaspasim" => Some(Network::Simnet),
            _ => None,
        }
    }

    /// Whether a node-reported network name such as `kaspa-mainnet` or
    /// `kaspa-testnet-10` refers to this network.
    pub fn matches_node_network(&self, reported: &str) -> bool {
        let Some(name) = reported.strip_prefix("kaspa-") else {
            return false;
        };
        let own = self.to_string();
        match name.strip_prefix(own.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('-'),
            None => false,
        }
    }

    /// Consensus parameters for this network.
    pub fn params(&self) -> NetworkParams {
        NetworkParams {
            network: *self,
            coinbase_maturity: DEFAULT_COINBASE_MATURITY,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Simnet => "simnet",
        };
        f.write_str(name)
    }
}

impl FromStr for Network {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "simnet" => Ok(Network::Simnet),
            _ => Err(ParseError::UnknownNetwork(s.to_string())),
        }
    }
}

/// Wallet-relevant consensus parameters of a network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkParams {
    pub network: Network,
    /// Minimum DAA score distance before a coinbase output may be spent.
    pub coinbase_maturity: u64,
}

impl NetworkParams {
    /// Address prefix destinations are decoded against.
    pub fn prefix(&self) -> &'static str {
        self.network.prefix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes() {
        assert_eq!(Network::Mainnet.prefix(), "kaspa");
        assert_eq!(Network::Testnet.prefix(), "kaspatest");
        assert_eq!(Network::Devnet.prefix(), "kaspadev");
        assert_eq!(Network::Simnet.prefix(), "kaspasim");
    }

    #[test]
    fn from_prefix_matches_prefix() {
        for net in [Network::Mainnet, Network::Testnet, Network::Devnet, Network::Simnet] {
            assert_eq!(Network::from_prefix(net.prefix()), Some(net));
        }
        assert_eq!(Network::from_prefix("bitcoin"), None);
    }

    #[test]
    fn parse_network_names() {
        assert_eq!("testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!("MAINNET".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!(
            "moonnet".parse::<Network>().unwrap_err(),
            ParseError::UnknownNetwork("moonnet".into())
        );
    }

    #[test]
    fn display_parses_back() {
        let net = Network::Simnet;
        assert_eq!(net.to_string().parse::<Network>().unwrap(), net);
    }

    #[test]
    fn node_network_names() {
        assert!(Network::Mainnet.matches_node_network("kaspa-mainnet"));
        assert!(Network::Testnet.matches_node_network("kaspa-testnet-10"));
        assert!(Network::Simnet.matches_node_network("kaspa-simnet"));
        assert!(!Network::Mainnet.matches_node_network("kaspa-testnet"));
        assert!(!Network::Testnet.matches_node_network("kaspa-testnetx"));
        assert!(!Network::Mainnet.matches_node_network("mainnet"));
    }

    #[test]
    fn params_carry_maturity() {
        let params = Network::Testnet.params();
        assert_eq!(params.coinbase_maturity, DEFAULT_COINBASE_MATURITY);
        assert_eq!(params.prefix(), "kaspatest");
    }

    #[test]
    fn serde_lowercase() {
        let json = serde_json::to_string(&Network::Devnet).unwrap();
        assert_eq!(json, "\"devnet\"");
        let back: Network = serde_json::from_str("\"simnet\"").unwrap();
        assert_eq!(back, Network::Simnet);
    }
}
