//! Well-known cluster endpoints.

use std::fmt;
use std::str::FromStr;

const MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";
const DEVNET_RPC: &str = "https://api.devnet.solana.com";
const TESTNET_RPC: &str = "https://api.testnet.solana.com";
const LOCALNET_RPC: &str = "http://127.0.0.1:8899";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cluster {
    Mainnet,
    Devnet,
    Testnet,
    Localnet,
}

impl Cluster {
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Cluster::Mainnet => MAINNET_RPC,
            Cluster::Devnet => DEVNET_RPC,
            Cluster::Testnet => TESTNET_RPC,
            Cluster::Localnet => LOCALNET_RPC,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cluster::Mainnet => "mainnet-beta",
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::Localnet => "localnet",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "mainnet-beta" | "m" => Ok(Cluster::Mainnet),
            "devnet" | "d" => Ok(Cluster::Devnet),
            "testnet" | "t" => Ok(Cluster::Testnet),
            "localnet" | "localhost" | "l" => Ok(Cluster::Localnet),
            other => Err(format!("unknown cluster '{}'", other)),
        }
    }
}

/// Guess which cluster an RPC URL points at. Custom providers usually embed
/// the cluster name in their hostname.
pub fn infer_cluster_from_url(url: &str) -> Option<Cluster> {
    let lower = url.to_lowercase();
    if lower.contains("devnet") {
        Some(Cluster::Devnet)
    } else if lower.contains("testnet") {
        Some(Cluster::Testnet)
    } else if lower.contains("mainnet") {
        Some(Cluster::Mainnet)
    } else if lower.contains("127.0.0.1") || lower.contains("localhost") {
        Some(Cluster::Localnet)
    } else {
        None
    }
}

/// Resolve the endpoint to use: an explicit URL wins, then a named cluster,
/// then devnet.
pub fn resolve_rpc_endpoint(url: Option<&str>, cluster: Option<Cluster>) -> String {
    if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
        return url.to_string();
    }
    cluster.unwrap_or(Cluster::Devnet).rpc_url().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cluster_names() {
        assert_eq!("mainnet-beta".parse::<Cluster>().unwrap(), Cluster::Mainnet);
        assert_eq!("Devnet".parse::<Cluster>().unwrap(), Cluster::Devnet);
        assert_eq!("localhost".parse::<Cluster>().unwrap(), Cluster::Localnet);
        assert!("moonnet".parse::<Cluster>().is_err());
    }

    #[test]
    fn test_infer_cluster_from_url() {
        assert_eq!(
            infer_cluster_from_url("https://api.devnet.solana.com"),
            Some(Cluster::Devnet)
        );
        assert_eq!(
            infer_cluster_from_url("https://solana-mainnet.example.com/v1/key"),
            Some(Cluster::Mainnet)
        );
        assert_eq!(
            infer_cluster_from_url("http://localhost:8899"),
            Some(Cluster::Localnet)
        );
        assert_eq!(infer_cluster_from_url("https://rpc.example.com"), None);
    }

    #[test]
    fn test_resolve_rpc_endpoint() {
        assert_eq!(resolve_rpc_endpoint(None, None), DEVNET_RPC);
        assert_eq!(resolve_rpc_endpoint(None, Some(Cluster::Testnet)), TESTNET_RPC);
        assert_eq!(
            resolve_rpc_endpoint(Some("http://node:8899"), Some(Cluster::Mainnet)),
            "http://node:8899"
        );
        assert_eq!(resolve_rpc_endpoint(Some("  "), None), DEVNET_RPC);
    }
}
