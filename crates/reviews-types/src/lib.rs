//! Shared types for the anchor-reviews workspace.
//!
//! Leaf crate with no knowledge of the network or of account layouts, so the
//! transport and core crates can both depend on it.
//!
//! - [`address`]: the 32-byte [`Pubkey`] used for programs and accounts
//! - [`encoding`]: base58 / base64 helpers with contextual errors
//! - [`env_utils`]: environment variable lookup for the configuration layer

pub mod address;
pub mod encoding;
pub mod env_utils;

pub use address::{Pubkey, PubkeyError, PUBKEY_BYTES};
pub use env_utils::env_string;
