//! anchor-reviews: project and review discovery for an Anchor program.
//!
//! The heavy lifting lives in the workspace crates; this package adds the
//! configuration layer and output rendering used by the `anchor-reviews` CLI.
//!
//! - [`reviews_core`]: discriminators, IDL layouts, decoding, assembly
//! - [`reviews_transport`]: `getProgramAccounts` scanning (RPC and snapshots)
//! - [`reviews_types`]: addresses and encodings
//!
//! See [`config`] for how endpoints and program ids are resolved.

pub mod config;
pub mod output;

pub use reviews_core;
pub use reviews_transport;
pub use reviews_types;

pub use config::{ConfigOverrides, IdlSource, ReviewsConfig, BUNDLED_IDL, DEFAULT_PROGRAM_ID};
