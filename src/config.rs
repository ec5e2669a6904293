//! Runtime configuration.
//!
//! Each setting resolves from an explicit override (CLI flag), then an
//! environment variable, then a built-in default:
//!
//! | setting | env var | default |
//! |---------|---------|---------|
//! | RPC endpoint | `SOLANA_RPC_URL` | devnet |
//! | program id | `REVIEWS_PROGRAM_ID` | [`DEFAULT_PROGRAM_ID`] |
//! | IDL | `REVIEWS_IDL_PATH` | bundled `idl/project_listing.json` |
//! | commitment | `SOLANA_COMMITMENT` | node default |
//! | request timeout | `SOLANA_RPC_TIMEOUT_SECS` | none |

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reviews_core::Idl;
use reviews_transport::{resolve_rpc_endpoint, Cluster, Commitment, RpcClient, Timeouts};
use reviews_types::encoding::parse_pubkey;
use reviews_types::{env_string, Pubkey};

pub const ENV_RPC_URL: &str = "SOLANA_RPC_URL";
pub const ENV_PROGRAM_ID: &str = "REVIEWS_PROGRAM_ID";
pub const ENV_IDL_PATH: &str = "REVIEWS_IDL_PATH";
pub const ENV_COMMITMENT: &str = "SOLANA_COMMITMENT";
pub const ENV_TIMEOUT_SECS: &str = "SOLANA_RPC_TIMEOUT_SECS";

/// The deployed project-listing program on devnet.
pub const DEFAULT_PROGRAM_ID: &str = "HahXGYW8GUUJSvnYRgj7LaHuvLcUhhz71tbRgX6aDPuE";

/// IDL of the project-listing program, embedded at build time.
pub const BUNDLED_IDL: &str = include_str!("../idl/project_listing.json");

/// Where the interface description comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdlSource {
    Bundled,
    File(PathBuf),
}

/// Values supplied on the command line; `None` falls through to the
/// environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub rpc_url: Option<String>,
    pub cluster: Option<Cluster>,
    pub program_id: Option<String>,
    pub idl: Option<PathBuf>,
    pub commitment: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewsConfig {
    pub rpc_url: String,
    pub program_id: Pubkey,
    pub idl: IdlSource,
    pub commitment: Option<Commitment>,
    pub timeout: Option<Duration>,
}

impl ReviewsConfig {
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        // A named cluster on the command line beats an ambient SOLANA_RPC_URL.
        let url = match (&overrides.rpc_url, overrides.cluster) {
            (Some(url), _) => Some(url.clone()),
            (None, Some(_)) => None,
            (None, None) => env_string(ENV_RPC_URL),
        };
        let rpc_url = resolve_rpc_endpoint(url.as_deref(), overrides.cluster);

        let program_text = overrides
            .program_id
            .clone()
            .or_else(|| env_string(ENV_PROGRAM_ID))
            .unwrap_or_else(|| DEFAULT_PROGRAM_ID.to_string());
        let program_id = parse_pubkey(&program_text, "program id")?;

        let idl = match overrides
            .idl
            .clone()
            .or_else(|| env_string(ENV_IDL_PATH).map(PathBuf::from))
        {
            Some(path) => IdlSource::File(path),
            None => IdlSource::Bundled,
        };

        let commitment = overrides
            .commitment
            .clone()
            .or_else(|| env_string(ENV_COMMITMENT))
            .map(|text| text.parse::<Commitment>().map_err(|e| anyhow!(e)))
            .transpose()
            .context("Invalid commitment level")?;

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => Some(secs),
            None => env_string(ENV_TIMEOUT_SECS)
                .map(|text| {
                    text.parse::<u64>()
                        .with_context(|| format!("{} must be whole seconds", ENV_TIMEOUT_SECS))
                })
                .transpose()?,
        };

        Ok(Self {
            rpc_url,
            program_id,
            idl,
            commitment,
            timeout: timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
        })
    }

    pub fn load_idl(&self) -> Result<Idl> {
        match &self.idl {
            IdlSource::Bundled => {
                Idl::from_json_str(BUNDLED_IDL).context("Bundled IDL is invalid")
            }
            IdlSource::File(path) => Idl::from_file(path),
        }
    }

    /// JSON-RPC client for the configured endpoint.
    pub fn rpc_client(&self) -> RpcClient {
        let timeouts = Timeouts {
            request: self.timeout,
            connect: self.timeout,
        };
        let client = RpcClient::with_timeouts(&self.rpc_url, timeouts);
        match self.commitment {
            Some(commitment) => client.with_commitment(commitment),
            None => client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment-dependent resolution is covered through explicit overrides so
    // tests do not race on process-wide variables.

    #[test]
    fn test_overrides_win() {
        let overrides = ConfigOverrides {
            rpc_url: Some("http://127.0.0.1:8899".into()),
            program_id: Some("11111111111111111111111111111111".into()),
            idl: Some(PathBuf::from("custom.json")),
            commitment: Some("finalized".into()),
            timeout_secs: Some(5),
            ..Default::default()
        };
        let config = ReviewsConfig::resolve(&overrides).unwrap();
        assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(config.program_id, Pubkey::default());
        assert_eq!(config.idl, IdlSource::File(PathBuf::from("custom.json")));
        assert_eq!(config.commitment, Some(Commitment::Finalized));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_cluster_selects_endpoint() {
        let overrides = ConfigOverrides {
            cluster: Some(Cluster::Testnet),
            program_id: Some(DEFAULT_PROGRAM_ID.into()),
            ..Default::default()
        };
        let config = ReviewsConfig::resolve(&overrides).unwrap();
        assert_eq!(config.rpc_url, Cluster::Testnet.rpc_url());
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let overrides = ConfigOverrides {
            program_id: Some(DEFAULT_PROGRAM_ID.into()),
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(ReviewsConfig::resolve(&overrides).unwrap().timeout, None);
    }

    #[test]
    fn test_bad_program_id() {
        let overrides = ConfigOverrides {
            program_id: Some("not-a-key".into()),
            ..Default::default()
        };
        let err = ReviewsConfig::resolve(&overrides).unwrap_err();
        assert!(format!("{:#}", err).contains("program id"));
    }

    #[test]
    fn test_bad_commitment() {
        let overrides = ConfigOverrides {
            program_id: Some(DEFAULT_PROGRAM_ID.into()),
            commitment: Some("eventually".into()),
            ..Default::default()
        };
        assert!(ReviewsConfig::resolve(&overrides).is_err());
    }

    #[test]
    fn test_bundled_idl_declares_both_kinds() {
        let config = ReviewsConfig {
            rpc_url: Cluster::Devnet.rpc_url().into(),
            program_id: Pubkey::default(),
            idl: IdlSource::Bundled,
            commitment: None,
            timeout: None,
        };
        let idl = config.load_idl().unwrap();
        assert_eq!(idl.name(), Some("project_listing"));
        assert!(idl.account("Project").is_some());
        assert!(idl.account("Review").is_some());
    }
}
