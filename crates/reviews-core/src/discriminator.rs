//! Account type discriminators.
//!
//! Anchor prefixes every account it owns with eight bytes naming the account's
//! type: the first eight bytes of `sha256("account:" ++ TypeName)`. Scans
//! filter on this prefix and the decoder re-checks it.

use std::fmt;

use reviews_types::encoding::base58_encode;
use sha2::{Digest, Sha256};

/// Length of the type tag at the start of every account payload.
pub const DISCRIMINATOR_LEN: usize = 8;

const ACCOUNT_NAMESPACE: &str = "account:";

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Discriminator([u8; DISCRIMINATOR_LEN]);

impl Discriminator {
    /// Tag for an account type name. Identical names always give identical tags.
    pub fn derive(type_name: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(ACCOUNT_NAMESPACE.as_bytes());
        hasher.update(type_name.as_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; DISCRIMINATOR_LEN];
        out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
        Self(out)
    }

    pub const fn from_bytes(bytes: [u8; DISCRIMINATOR_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DISCRIMINATOR_LEN] {
        &self.0
    }

    /// Whether `payload` begins with this tag.
    pub fn matches(&self, payload: &[u8]) -> bool {
        payload.starts_with(&self.0)
    }

    /// Leading tag of a payload, if it is long enough to carry one.
    pub fn of_payload(payload: &[u8]) -> Option<Self> {
        payload
            .get(..DISCRIMINATOR_LEN)
            .and_then(|head| head.try_into().ok())
            .map(Self)
    }

    /// Form used in RPC memcmp filters.
    pub fn to_base58(&self) -> String {
        base58_encode(&self.0)
    }
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Discriminator({})", hex::encode(self.0))
    }
}
