//! JSON-RPC client for Solana nodes.
//!
//! Only the account-scan method is implemented: `getProgramAccounts` with
//! `memcmp` filters, base64 account data, and the whole result set in one
//! response.
//!
//! ## Endpoints
//! - Mainnet: `https://api.mainnet-beta.solana.com` (most public mainnet nodes
//!   disable `getProgramAccounts`; use a provider endpoint)
//! - Devnet: `https://api.devnet.solana.com`
//!
//! ## Usage
//!
//! ```ignore
//! let client = RpcClient::devnet();
//! let accounts = client.get_program_accounts(&program_id, &[MemcmpFilter::prefix(disc)?])?;
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reviews_types::encoding::{base58_decode, base58_encode, base64_decode};
use reviews_types::Pubkey;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::network::Cluster;
use crate::scanner::{AccountScanner, MemcmpFilter, RawAccount, ScanError};

/// Commitment level attached to reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(format!("unknown commitment '{}'", other)),
        }
    }
}

/// Blocking JSON-RPC client. Cheap to clone (the agent shares its pool).
#[derive(Clone)]
pub struct RpcClient {
    endpoint: String,
    agent: ureq::Agent,
    commitment: Option<Commitment>,
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("endpoint", &self.endpoint)
            .field("commitment", &self.commitment)
            .finish()
    }
}

/// Connect bound applied when none is configured. `ureq` agents always
/// carry one; this is its stock value.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Optional transport timeouts. An unset `request` leaves the whole call
/// unbounded; an unset `connect` falls back to [`DEFAULT_CONNECT_TIMEOUT`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeouts {
    pub request: Option<Duration>,
    pub connect: Option<Duration>,
}

impl Timeouts {
    pub fn connect_or_default(&self) -> Duration {
        self.connect.unwrap_or(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl RpcClient {
    /// Client for a cluster's public endpoint.
    pub fn for_cluster(cluster: Cluster) -> Self {
        Self::new(cluster.rpc_url())
    }

    pub fn devnet() -> Self {
        Self::for_cluster(Cluster::Devnet)
    }

    /// Client for a custom endpoint.
    pub fn new(endpoint: &str) -> Self {
        Self::with_timeouts(endpoint, Timeouts::default())
    }

    pub fn with_timeouts(endpoint: &str, timeouts: Timeouts) -> Self {
        let mut builder = ureq::AgentBuilder::new().timeout_connect(timeouts.connect_or_default());
        if let Some(timeout) = timeouts.request {
            builder = builder.timeout(timeout);
        }
        Self {
            endpoint: endpoint.to_string(),
            agent: builder.build(),
            commitment: None,
        }
    }

    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = Some(commitment);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one JSON-RPC request and return its `result`.
    fn call(&self, body: &Value) -> Result<Value, ScanError> {
        let response: Value = match self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(body)
        {
            Ok(resp) => resp.into_json().map_err(|e| {
                ScanError::network(&self.endpoint, format!("failed to parse RPC response: {}", e))
            })?,
            Err(ureq::Error::Status(code, resp)) => {
                // Nodes often put a JSON-RPC error object in non-2xx bodies.
                match resp.into_json::<Value>() {
                    Ok(body) if body.get("error").is_some() => body,
                    _ => {
                        return Err(ScanError::network(
                            &self.endpoint,
                            format!("HTTP status {}", code),
                        ))
                    }
                }
            }
            Err(e) => {
                return Err(ScanError::network(
                    &self.endpoint,
                    format!("RPC request failed: {}", e),
                ))
            }
        };

        extract_result(&self.endpoint, response)
    }

    /// Enumerate accounts owned by `program_id` matching every filter.
    pub fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<RawAccount>, ScanError> {
        let body = program_accounts_request(program_id, filters, self.commitment);
        debug!(
            endpoint = %self.endpoint,
            program = %program_id,
            filters = filters.len(),
            "getProgramAccounts"
        );
        let result = self.call(&body)?;
        let accounts = parse_keyed_accounts(&self.endpoint, result)?
            .into_iter()
            .map(|owned| owned.raw)
            .collect::<Vec<_>>();
        debug!(program = %program_id, count = accounts.len(), "scan complete");
        Ok(accounts)
    }
}

#[async_trait]
impl AccountScanner for RpcClient {
    async fn scan(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<RawAccount>, ScanError> {
        let client = self.clone();
        let program_id = *program_id;
        let filters = filters.to_vec();
        tokio::task::spawn_blocking(move || client.get_program_accounts(&program_id, &filters))
            .await
            .map_err(|e| ScanError::network(&self.endpoint, format!("scan task failed: {}", e)))?
    }
}

/// Build the `getProgramAccounts` request body.
pub fn program_accounts_request(
    program_id: &Pubkey,
    filters: &[MemcmpFilter],
    commitment: Option<Commitment>,
) -> Value {
    let filters: Vec<Value> = filters
        .iter()
        .map(|f| {
            json!({
                "memcmp": {
                    "offset": f.offset(),
                    "bytes": base58_encode(f.bytes()),
                }
            })
        })
        .collect();

    let mut config = json!({
        "encoding": "base64",
        "filters": filters,
    });
    if let Some(commitment) = commitment {
        config["commitment"] = json!(commitment.as_str());
    }

    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getProgramAccounts",
        "params": [program_id.to_base58(), config],
    })
}

/// Pull `result` out of a JSON-RPC response, mapping an `error` object.
pub(crate) fn extract_result(endpoint: &str, mut response: Value) -> Result<Value, ScanError> {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        return Err(ScanError::Rpc {
            endpoint: endpoint.to_string(),
            code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }
    match response.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(ScanError::network(endpoint, "no result in RPC response")),
    }
}

#[derive(Debug, Deserialize)]
struct KeyedAccountJson {
    pubkey: String,
    account: AccountJson,
}

#[derive(Debug, Deserialize)]
struct AccountJson {
    data: AccountDataJson,
    #[serde(default)]
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AccountDataJson {
    /// `[payload, encoding]`
    Encoded(String, String),
    /// Legacy binary form: bare base58 string.
    Legacy(String),
}

/// Account plus the owner the node reported for it.
#[derive(Debug, Clone)]
pub(crate) struct OwnedAccount {
    pub raw: RawAccount,
    pub owner: Option<Pubkey>,
}

/// Parse a `getProgramAccounts` result: either the bare array or the
/// `{context, value}` wrapper returned when `withContext` is set.
pub(crate) fn parse_keyed_accounts(
    endpoint: &str,
    result: Value,
) -> Result<Vec<OwnedAccount>, ScanError> {
    let list = match result {
        Value::Object(mut map) if map.contains_key("value") => {
            map.remove("value").unwrap_or(Value::Null)
        }
        other => other,
    };
    let entries: Vec<KeyedAccountJson> = serde_json::from_value(list).map_err(|e| {
        ScanError::network(endpoint, format!("unexpected getProgramAccounts shape: {}", e))
    })?;

    entries
        .into_iter()
        .map(|entry| decode_entry(endpoint, entry))
        .collect()
}

fn decode_entry(endpoint: &str, entry: KeyedAccountJson) -> Result<OwnedAccount, ScanError> {
    let malformed = |msg: String| ScanError::network(endpoint, msg);

    let address: Pubkey = entry
        .pubkey
        .parse()
        .map_err(|e| malformed(format!("bad account pubkey '{}': {}", entry.pubkey, e)))?;

    let data = match &entry.account.data {
        AccountDataJson::Encoded(payload, encoding) => match encoding.as_str() {
            "base64" => base64_decode(payload, "account data"),
            "base58" => base58_decode(payload, "account data"),
            other => return Err(malformed(format!("unsupported account encoding '{}'", other))),
        },
        AccountDataJson::Legacy(payload) => base58_decode(payload, "account data"),
    }
    .map_err(|e| malformed(format!("{} for {}", e, address)))?;

    let owner = match entry.account.owner.as_deref() {
        Some(text) => Some(
            text.parse::<Pubkey>()
                .map_err(|e| malformed(format!("bad owner '{}': {}", text, e)))?,
        ),
        None => None,
    };

    Ok(OwnedAccount {
        raw: RawAccount { address, data },
        owner,
    })
}
