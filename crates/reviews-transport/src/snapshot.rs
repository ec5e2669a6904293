//! File-backed account scanner.
//!
//! Answers scans from a saved `getProgramAccounts` result instead of a live
//! node, applying the same memcmp semantics the node would. Accepted file
//! shapes:
//!
//! - the bare result array (`[{"pubkey": .., "account": {..}}, ..]`)
//! - the `{context, value}` wrapper
//! - a full JSON-RPC response (`{"jsonrpc": "2.0", "result": ..}`)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reviews_types::Pubkey;
use serde_json::Value;
use tracing::debug;

use crate::rpc::{extract_result, parse_keyed_accounts, OwnedAccount};
use crate::scanner::{AccountScanner, MemcmpFilter, RawAccount, ScanError};

/// Scanner over an in-memory account set.
#[derive(Debug, Clone, Default)]
pub struct SnapshotScanner {
    source: String,
    accounts: Vec<OwnedAccount>,
}

impl SnapshotScanner {
    /// Accounts all owned by `owner`.
    pub fn from_accounts(owner: Pubkey, accounts: Vec<RawAccount>) -> Self {
        Self {
            source: "memory".to_string(),
            accounts: accounts
                .into_iter()
                .map(|raw| OwnedAccount {
                    raw,
                    owner: Some(owner),
                })
                .collect(),
        }
    }

    /// Parse a snapshot document (see module docs for accepted shapes).
    pub fn from_json_str(source: &str, json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .with_context(|| format!("Failed to parse snapshot JSON from {}", source))?;
        let result = if value.get("jsonrpc").is_some() {
            extract_result(source, value)?
        } else {
            value
        };
        let accounts = parse_keyed_accounts(source, result)?;
        Ok(Self {
            source: source.to_string(),
            accounts,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;
        Self::from_json_str(&path.display().to_string(), &json)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Accounts the scan would return, in snapshot order. Entries without a
    /// recorded owner are assumed to belong to the scanned program, matching
    /// what a node-side `getProgramAccounts` dump contains.
    fn select(&self, program_id: &Pubkey, filters: &[MemcmpFilter]) -> Vec<RawAccount> {
        self.accounts
            .iter()
            .filter(|a| a.owner.map_or(true, |owner| owner == *program_id))
            .filter(|a| filters.iter().all(|f| f.matches(&a.raw.data)))
            .map(|a| a.raw.clone())
            .collect()
    }
}

#[async_trait]
impl AccountScanner for SnapshotScanner {
    async fn scan(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<RawAccount>, ScanError> {
        let selected = self.select(program_id, filters);
        debug!(
            source = %self.source,
            program = %program_id,
            matched = selected.len(),
            total = self.accounts.len(),
            "snapshot scan"
        );
        Ok(selected)
    }
}
