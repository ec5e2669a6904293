//! Account fixtures encoded with the bundled project-listing IDL.

use std::path::{Path, PathBuf};

use anchor_reviews::{BUNDLED_IDL, DEFAULT_PROGRAM_ID};
use reviews_core::{encode_account, DecodedAccount, FieldValue, Idl};
use reviews_transport::RawAccount;
use reviews_types::encoding::base64_encode;
use reviews_types::Pubkey;
use serde_json::json;

pub fn bundled_idl() -> Idl {
    Idl::from_json_str(BUNDLED_IDL).expect("bundled IDL should parse")
}

pub fn program_id() -> Pubkey {
    DEFAULT_PROGRAM_ID.parse().expect("default program id")
}

/// Deterministic address made of one repeated byte.
pub fn key(byte: u8) -> Pubkey {
    Pubkey::new([byte; 32])
}

pub fn project_account(address: Pubkey, name: &str, category: &str, listed_by: Pubkey) -> RawAccount {
    let decoded = DecodedAccount {
        type_name: "Project".into(),
        fields: vec![
            ("name".into(), FieldValue::Text(name.into())),
            ("category".into(), FieldValue::Text(category.into())),
            ("listed_by".into(), FieldValue::Address(listed_by)),
        ],
    };
    let data = encode_account(&bundled_idl(), "Project", &decoded).expect("encode project");
    RawAccount::new(address, data)
}

pub fn review_account(address: Pubkey, project_id: Pubkey, rating: u8, text: &str) -> RawAccount {
    let decoded = DecodedAccount {
        type_name: "Review".into(),
        fields: vec![
            ("project_id".into(), FieldValue::Address(project_id)),
            ("reviewer".into(), FieldValue::Address(key(250))),
            ("rating".into(), FieldValue::Unsigned(rating.into())),
            ("review_text".into(), FieldValue::Text(text.into())),
        ],
    };
    let data = encode_account(&bundled_idl(), "Review", &decoded).expect("encode review");
    RawAccount::new(address, data)
}

/// A full `getProgramAccounts` JSON-RPC response holding `accounts`.
pub fn snapshot_json(owner: &Pubkey, accounts: &[RawAccount]) -> String {
    let result: Vec<_> = accounts
        .iter()
        .map(|account| {
            json!({
                "pubkey": account.address.to_string(),
                "account": {
                    "data": [base64_encode(&account.data), "base64"],
                    "executable": false,
                    "lamports": 1_461_600,
                    "owner": owner.to_string(),
                    "rentEpoch": 18_446_744_073_709_551_615u64,
                    "space": account.data.len(),
                }
            })
        })
        .collect();
    json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string()
}

/// Write a snapshot file for `accounts` into `dir`.
pub fn write_snapshot(dir: &Path, accounts: &[RawAccount]) -> PathBuf {
    let path = dir.join("accounts.json");
    std::fs::write(&path, snapshot_json(&program_id(), accounts)).expect("write snapshot");
    path
}
