//! The account-scan boundary.
//!
//! Everything that enumerates program-owned accounts goes through
//! [`AccountScanner`]: the JSON-RPC client, the snapshot scanner used for
//! offline runs, and test doubles. A scan is one request returning the whole
//! result set; there is no pagination, timeout or retry at this layer.

use std::fmt;

use async_trait::async_trait;
use reviews_types::Pubkey;
use serde::{Deserialize, Serialize};

/// Largest memcmp filter the node accepts, in raw bytes.
pub const MAX_MEMCMP_BYTES: usize = 128;

/// Match accounts whose data at `offset` starts with `bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemcmpFilter {
    offset: usize,
    bytes: Vec<u8>,
}

impl MemcmpFilter {
    /// Build a filter, rejecting shapes the node would refuse.
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Result<Self, ScanError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ScanError::InvalidFilter {
                reason: "memcmp filter bytes are empty".to_string(),
            });
        }
        if bytes.len() > MAX_MEMCMP_BYTES {
            return Err(ScanError::InvalidFilter {
                reason: format!(
                    "memcmp filter is {} bytes, node maximum is {}",
                    bytes.len(),
                    MAX_MEMCMP_BYTES
                ),
            });
        }
        Ok(Self { offset, bytes })
    }

    /// Byte-prefix filter at offset 0.
    pub fn prefix(bytes: impl Into<Vec<u8>>) -> Result<Self, ScanError> {
        Self::new(0, bytes)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether `data` satisfies this filter.
    pub fn matches(&self, data: &[u8]) -> bool {
        data.get(self.offset..)
            .is_some_and(|tail| tail.starts_with(&self.bytes))
    }
}

/// One account returned by a scan: its address and opaque payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAccount {
    pub address: Pubkey,
    #[serde(with = "data_base64")]
    pub data: Vec<u8>,
}

impl RawAccount {
    pub fn new(address: Pubkey, data: impl Into<Vec<u8>>) -> Self {
        Self {
            address,
            data: data.into(),
        }
    }
}

mod data_base64 {
    use reviews_types::encoding::{base64_decode, base64_encode};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64_encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64_decode(&s, "account data").map_err(serde::de::Error::custom)
    }
}

/// Failures of a scan request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Connectivity, timeout, HTTP status or malformed response.
    Network {
        endpoint: String,
        message: String,
    },
    /// The node answered with a JSON-RPC error object.
    Rpc {
        endpoint: String,
        code: i64,
        message: String,
    },
    /// Filter is empty or longer than the node allows.
    InvalidFilter { reason: String },
}

impl ScanError {
    pub fn network(endpoint: impl Into<String>, message: impl fmt::Display) -> Self {
        ScanError::Network {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// True for everything that came back from (or failed to reach) the node.
    pub fn is_network(&self) -> bool {
        matches!(self, ScanError::Network { .. } | ScanError::Rpc { .. })
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Network { endpoint, message } => {
                write!(f, "NetworkError: {} ({})", message, endpoint)
            }
            ScanError::Rpc {
                endpoint,
                code,
                message,
            } => write!(f, "NetworkError: RPC error {}: {} ({})", code, message, endpoint),
            ScanError::InvalidFilter { reason } => write!(f, "InvalidFilter: {}", reason),
        }
    }
}

impl std::error::Error for ScanError {}

/// Enumerates accounts owned by a program.
#[async_trait]
pub trait AccountScanner: Send + Sync {
    /// Return every account owned by `program_id` that satisfies all `filters`.
    async fn scan(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<RawAccount>, ScanError>;

    /// Return every account owned by `program_id` whose data starts with `prefix`.
    async fn scan_prefix(
        &self,
        program_id: &Pubkey,
        prefix: &[u8],
    ) -> Result<Vec<RawAccount>, ScanError> {
        let filter = MemcmpFilter::prefix(prefix)?;
        self.scan(program_id, std::slice::from_ref(&filter)).await
    }
}

#[async_trait]
impl<S: AccountScanner + ?Sized> AccountScanner for std::sync::Arc<S> {
    async fn scan(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<RawAccount>, ScanError> {
        (**self).scan(program_id, filters).await
    }
}
