//! Prefix-qualified wallet addresses.
//!
//! Addresses have the form `<prefix>:<payload>` where the prefix names the
//! network (`kaspa`, `kaspatest`, `kaspadev`, `kaspasim`) and the payload is
//! a version symbol, a 32-byte public-key hash in 5-bit groups, and a 6-symbol
//! [Bech32m] checksum. The checksum commits to the prefix, so an address copied
//! from another network still decodes cleanly and is rejected as
//! [`AddressError::WrongPrefix`] rather than as a checksum failure.
//!
//! [Bech32m]: https://github.com/bitcoin/bips/blob/master/bip-0350.mediawiki

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;
use crate::params::Network;

/// Bech32m checksum constant.
const BECH32M_CONST: u32 = 0x2bc830a3;

/// Symbol alphabet for 5-bit values.
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const CHECKSUM_LEN: usize = 6;

/// Current payload version (public-key hash).
pub const ADDRESS_VERSION: u8 = 0;

/// A wallet address on a specific network.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    network: Network,
    version: u8,
    payload: [u8; 32],
}

impl Address {
    pub fn new(network: Network, payload: [u8; 32]) -> Self {
        Self {
            network,
            version: ADDRESS_VERSION,
            payload,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn prefix(&self) -> &'static str {
        self.network.prefix()
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// The 32-byte public-key hash carried by this address.
    pub fn payload(&self) -> &[u8; 32] {
        &self.payload
    }

    /// Encode as `<prefix>:<payload><checksum>`.
    pub fn encode(&self) -> String {
        let prefix = self.prefix();
        let mut symbols = Vec::with_capacity(1 + 52 + CHECKSUM_LEN);
        symbols.push(self.version);
        symbols.extend(regroup(&self.payload, 8, 5, true).unwrap_or_default());
        let checksum = checksum(prefix, &symbols);
        symbols.extend_from_slice(&checksum);

        let mut out = String::with_capacity(prefix.len() + 1 + symbols.len());
        out.push_str(prefix);
        out.push(':');
        out.extend(symbols.iter().map(|&s| CHARSET[s as usize] as char));
        out
    }

    /// Decode an address of any known network.
    pub fn decode(s: &str) -> Result<Self, AddressError> {
        Self::decode_inner(s, None)
    }

    /// Decode an address and require it to belong to the network with `prefix`.
    pub fn decode_with_prefix(s: &str, prefix: &str) -> Result<Self, AddressError> {
        Self::decode_inner(s, Some(prefix))
    }

    fn decode_inner(s: &str, expected_prefix: Option<&str>) -> Result<Self, AddressError> {
        let has_lower = s.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = s.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper {
            return Err(AddressError::MixedCase);
        }
        let s = s.to_ascii_lowercase();

        let (prefix, data) = s.split_once(':').ok_or(AddressError::MissingSeparator)?;
        if prefix.is_empty() || data.len() < 1 + CHECKSUM_LEN {
            return Err(AddressError::InvalidLength);
        }

        let symbols = data
            .chars()
            .map(|c| {
                CHARSET
                    .iter()
                    .position(|&ch| ch as char == c)
                    .map(|pos| pos as u8)
                    .ok_or(AddressError::InvalidCharacter(c))
            })
            .collect::<Result<Vec<u8>, _>>()?;

        if !verify_checksum(prefix, &symbols) {
            return Err(AddressError::InvalidChecksum);
        }

        let network = Network::from_prefix(prefix)
            .ok_or_else(|| AddressError::UnknownPrefix(prefix.to_string()))?;
        if let Some(expected) = expected_prefix {
            if expected != prefix {
                return Err(AddressError::WrongPrefix {
                    expected: expected.to_string(),
                    got: prefix.to_string(),
                });
            }
        }

        let body = &symbols[..symbols.len() - CHECKSUM_LEN];
        let version = body[0];
        if version != ADDRESS_VERSION {
            return Err(AddressError::InvalidVersion(version));
        }
        let bytes = regroup(&body[1..], 5, 8, false).ok_or(AddressError::InvalidPadding)?;
        let payload: [u8; 32] = bytes.try_into().map_err(|_| AddressError::InvalidLength)?;

        Ok(Self {
            network,
            version,
            payload,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}

// --- checksum internals ---

fn polymod(values: impl IntoIterator<Item = u8>) -> u32 {
    const GEN: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];
    values.into_iter().fold(1u32, |chk, v| {
        let top = chk >> 25;
        let mut chk = ((chk & 0x1ffffff) << 5) ^ u32::from(v);
        for (i, g) in GEN.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
        chk
    })
}

/// Prefix symbols committed to by the checksum: high bits, a zero, low bits.
fn prefix_symbols(prefix: &str) -> impl Iterator<Item = u8> + '_ {
    prefix
        .bytes()
        .map(|c| c >> 5)
        .chain(std::iter::once(0))
        .chain(prefix.bytes().map(|c| c & 31))
}

fn checksum(prefix: &str, symbols: &[u8]) -> [u8; CHECKSUM_LEN] {
    let values = prefix_symbols(prefix)
        .chain(symbols.iter().copied())
        .chain([0u8; CHECKSUM_LEN]);
    let pm = polymod(values) ^ BECH32M_CONST;
    let mut out = [0u8; CHECKSUM_LEN];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = ((pm >> (5 * (CHECKSUM_LEN - 1 - i))) & 31) as u8;
    }
    out
}

fn verify_checksum(prefix: &str, symbols_with_checksum: &[u8]) -> bool {
    polymod(prefix_symbols(prefix).chain(symbols_with_checksum.iter().copied())) == BECH32M_CONST
}

/// Regroup a bit stream from `from`-bit to `to`-bit values.
fn regroup(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max = (1u32 << to) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    for &value in data {
        let v = u32::from(value);
        if v >> from != 0 {
            return None;
        }
        acc = (acc << from) | v;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max) != 0 {
        return None;
    }
    Some(out)
}
