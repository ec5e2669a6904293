#![allow(dead_code, unused_imports)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: account payloads built against the bundled IDL, snapshot files
//! - `mocks`: scanners that fail or misbehave on demand
//! - `network`: devnet endpoint for the ignored network tests

pub mod fixtures;
pub mod mocks;
pub mod network;

pub use fixtures::{
    bundled_idl, key, program_id, project_account, review_account, snapshot_json, write_snapshot,
};
pub use mocks::{FlakyScanner, MistaggedScanner};
pub use network::devnet_endpoint;
