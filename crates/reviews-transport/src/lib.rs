//! Ledger transport layer.
//!
//! Enumerates program-owned accounts for the assembler:
//!
//! - [`scanner`]: the [`AccountScanner`] trait, [`MemcmpFilter`], [`RawAccount`], [`ScanError`]
//! - [`rpc`]: JSON-RPC `getProgramAccounts` client for live nodes
//! - [`snapshot`]: scanner backed by a saved `getProgramAccounts` result
//! - [`network`]: well-known cluster endpoints
//!
//! # Example
//!
//! ```ignore
//! use reviews_transport::{AccountScanner, RpcClient};
//!
//! let client = RpcClient::devnet();
//! let accounts = client.scan_prefix(&program_id, discriminator.as_bytes()).await?;
//! ```

pub mod network;
pub mod rpc;
pub mod scanner;
pub mod snapshot;

pub use network::{infer_cluster_from_url, resolve_rpc_endpoint, Cluster};
pub use rpc::{Commitment, RpcClient, Timeouts, DEFAULT_CONNECT_TIMEOUT};
pub use scanner::{AccountScanner, MemcmpFilter, RawAccount, ScanError, MAX_MEMCMP_BYTES};
pub use snapshot::SnapshotScanner;
