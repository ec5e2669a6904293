//! CLI tests for the anchor-reviews binary.
//!
//! `list` runs against snapshot files so no node is needed.

mod common;

use assert_cmd::Command;
use common::*;
use predicates::prelude::*;
use reviews_types::encoding::base64_encode;
use tempfile::TempDir;

fn anchor_reviews() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("anchor-reviews").unwrap();
    // Keep ambient configuration out of the tests.
    for var in [
        "SOLANA_RPC_URL",
        "REVIEWS_PROGRAM_ID",
        "REVIEWS_IDL_PATH",
        "SOLANA_COMMITMENT",
        "SOLANA_RPC_TIMEOUT_SECS",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help() {
    anchor_reviews()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("discriminator"))
        .stdout(predicate::str::contains("decode"));
}

#[test]
fn test_discriminator_known_values() {
    anchor_reviews()
        .args(["discriminator", "Project", "Review"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project: cda8bdcab5f78e13"))
        .stdout(predicate::str::contains("Review: 7c3fcbd7e21ede0f"));
}

#[test]
fn test_discriminator_json() {
    let output = anchor_reviews()
        .args(["discriminator", "Project", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["type_name"], "Project");
    assert_eq!(json[0]["hex"], "cda8bdcab5f78e13");
    assert_eq!(
        json[0]["bytes"],
        serde_json::json!([205, 168, 189, 202, 181, 247, 142, 19])
    );
}

#[test]
fn test_discriminator_requires_a_name() {
    anchor_reviews().arg("discriminator").assert().failure();
}

#[test]
fn test_decode_review_payload() {
    let account = review_account(key(10), key(1), 4, "Great docs");
    anchor_reviews()
        .args(["decode", "--type", "Review", "--data"])
        .arg(base64_encode(&account.data))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"rating\": 4"))
        .stdout(predicate::str::contains("\"review_text\": \"Great docs\""))
        .stdout(predicate::str::contains(key(1).to_string()));
}

#[test]
fn test_decode_truncated_payload_fails() {
    let account = review_account(key(10), key(1), 4, "Great docs");
    let data = &account.data[..account.data.len() - 3];
    anchor_reviews()
        .args(["decode", "--type", "Review", "--data"])
        .arg(base64_encode(data))
        .assert()
        .failure()
        .stderr(predicate::str::contains("TruncatedPayload"));
}

#[test]
fn test_decode_unknown_type_fails() {
    anchor_reviews()
        .args(["decode", "--type", "Vote", "--data", "AAAAAAAAAAA="])
        .assert()
        .failure()
        .stderr(predicate::str::contains("UnknownType"));
}

#[test]
fn test_list_from_snapshot() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(
        dir.path(),
        &[
            project_account(key(1), "Orca", "DEX", key(100)),
            project_account(key(2), "Tensor", "NFT", key(101)),
            review_account(key(10), key(1), 5, "Best UX on Solana"),
        ],
    );

    anchor_reviews()
        .arg("list")
        .arg("--snapshot")
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("Project 1\nName: Orca\nCategory: DEX"))
        .stdout(predicate::str::contains(format!("Listed by: {}", key(100))))
        .stdout(predicate::str::contains("Rating: 5/5"))
        .stdout(predicate::str::contains("Review: Best UX on Solana"))
        .stdout(predicate::str::contains("Project 2\nName: Tensor"))
        .stdout(predicate::str::contains("No reviews yet."));
}

#[test]
fn test_list_json_reports_skipped() {
    let dir = TempDir::new().unwrap();
    let mut broken = review_account(key(11), key(1), 2, "cut off");
    broken.data.truncate(broken.data.len() - 2);
    let snapshot = write_snapshot(
        dir.path(),
        &[project_account(key(1), "Orca", "DEX", key(100)), broken],
    );

    let output = anchor_reviews()
        .arg("list")
        .arg("--snapshot")
        .arg(&snapshot)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["projects"][0]["name"], "Orca");
    assert_eq!(json["projects"][0]["reviews"], serde_json::json!([]));
    assert_eq!(json["skipped"][0]["failure"], "TruncatedPayload");
    assert_eq!(json["skipped"][0]["address"], key(11).to_string());
}

#[test]
fn test_list_exits_nonzero_when_nothing_is_declared() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(dir.path(), &[]);
    let idl = dir.path().join("empty_idl.json");
    std::fs::write(&idl, r#"{ "accounts": [], "types": [] }"#).unwrap();

    anchor_reviews()
        .arg("list")
        .arg("--snapshot")
        .arg(&snapshot)
        .arg("--idl")
        .arg(&idl)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unavailable: Project records (UnknownType)"));
}

#[test]
fn test_invalid_program_id() {
    anchor_reviews()
        .args(["list", "--program-id", "not-a-key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid program id"));
}

#[test]
fn test_missing_snapshot_file() {
    anchor_reviews()
        .args(["list", "--snapshot", "/nonexistent/accounts.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load snapshot"));
}

#[test]
fn test_list_logs_cluster_of_endpoint() {
    // Nothing listens on the discard port, so both scans fail fast.
    anchor_reviews()
        .env("RUST_LOG", "info")
        .args(["list", "--rpc-url", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scanning"))
        .stderr(predicate::str::contains("localnet"));
}

#[test]
#[ignore = "requires network access to Solana devnet"]
fn test_list_devnet() {
    anchor_reviews()
        .arg("list")
        .arg("--rpc-url")
        .arg(devnet_endpoint())
        .assert()
        .success();
}
