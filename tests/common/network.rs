//! Network-dependent test utilities.

use std::env;

use reviews_transport::Cluster;

/// Devnet endpoint, overridable through `SOLANA_RPC_URL`.
pub fn devnet_endpoint() -> String {
    env::var("SOLANA_RPC_URL").unwrap_or_else(|_| Cluster::Devnet.rpc_url().to_string())
}
