//! Encoding utilities for base58 and base64.
//!
//! Shared by the transport (RPC payloads are base64, filters base58) and the
//! CLI (`decode --data` takes base64). Each decoder takes a `context`
//! string so error messages say what was being decoded.

use anyhow::{anyhow, Result};
use base64::Engine;

use crate::address::Pubkey;

// =============================================================================
// Base58
// =============================================================================

/// Encode bytes as base58 (the ledger's text encoding for keys and filters).
pub fn base58_encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode base58 text with a context-aware error message.
pub fn base58_decode(text: &str, context: &str) -> Result<Vec<u8>> {
    bs58::decode(text.trim())
        .into_vec()
        .map_err(|e| anyhow!("Invalid {} base58 '{}': {}", context, text, e))
}

/// Parse an address with a context-aware error message.
///
/// # Examples
///
/// ```
/// use reviews_types::encoding::parse_pubkey;
///
/// let program = parse_pubkey("HahXGYW8GUUJSvnYRgj7LaHuvLcUhhz71tbRgX6aDPuE", "program id").unwrap();
/// assert_eq!(program.to_string(), "HahXGYW8GUUJSvnYRgj7LaHuvLcUhhz71tbRgX6aDPuE");
/// assert!(parse_pubkey("not-a-key", "program id").is_err());
/// ```
pub fn parse_pubkey(text: &str, context: &str) -> Result<Pubkey> {
    text.parse::<Pubkey>()
        .map_err(|e| anyhow!("Invalid {} '{}': {}", context, text, e))
}

// =============================================================================
// Base64
// =============================================================================

/// Encode bytes to a standard base64 string.
pub fn base64_encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode base64, accepting both padded and unpadded input.
pub fn base64_decode(b64: &str, context: &str) -> Result<Vec<u8>> {
    let trimmed = b64.trim();
    base64::engine::general_purpose::STANDARD
        .decode(trimmed)
        .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(trimmed))
        .map_err(|e| anyhow!("Failed to decode {} from base64: {}", context, e))
}
