//! Ledger addresses.
//!
//! Accounts, programs and wallets on Solana are all identified by a 32-byte
//! public key. The text form is base58 (e.g.
//! `HahXGYW8GUUJSvnYRgj7LaHuvLcUhhz71tbRgX6aDPuE`), but comparisons and map
//! keys always use the raw bytes: two spellings of the same key can never
//! land in different buckets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Width of an address in bytes.
pub const PUBKEY_BYTES: usize = 32;

/// Longest base58 rendering of a 32-byte value.
const MAX_BASE58_LEN: usize = 44;

/// A 32-byte ledger address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pubkey([u8; PUBKEY_BYTES]);

/// Reasons a string or byte slice is not a valid address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PubkeyError {
    /// The text form is longer than any 32-byte value can encode to.
    TooLong(usize),
    /// The text contains characters outside the base58 alphabet.
    InvalidBase58(String),
    /// Decoded to the wrong number of bytes.
    WrongLength(usize),
}

impl fmt::Display for PubkeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PubkeyError::TooLong(len) => {
                write!(f, "address text is {} characters, max {}", len, MAX_BASE58_LEN)
            }
            PubkeyError::InvalidBase58(msg) => write!(f, "invalid base58 address: {}", msg),
            PubkeyError::WrongLength(len) => {
                write!(f, "address must be {} bytes, got {}", PUBKEY_BYTES, len)
            }
        }
    }
}

impl std::error::Error for PubkeyError {}

impl Pubkey {
    pub const fn new(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice, which must be exactly 32 bytes.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, PubkeyError> {
        let arr: [u8; PUBKEY_BYTES] = bytes
            .try_into()
            .map_err(|_| PubkeyError::WrongLength(bytes.len()))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; PUBKEY_BYTES] {
        &self.0
    }

    /// Base58 text form, the canonical way addresses are shown and sent over RPC.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl FromStr for Pubkey {
    type Err = PubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() > MAX_BASE58_LEN {
            return Err(PubkeyError::TooLong(s.len()));
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| PubkeyError::InvalidBase58(e.to_string()))?;
        Self::try_from_slice(&bytes)
    }
}

impl From<[u8; PUBKEY_BYTES]> for Pubkey {
    fn from(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self.to_base58())
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
