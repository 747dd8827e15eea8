//! Integration tests for the backup CLI
//!
//! These tests require a running S3-compatible server with an existing bucket.
//!
//! Run with:
//! ```bash
//! # Start an S3-compatible server, then
//! export TEST_S3_ENDPOINT=http://localhost:9000
//! export TEST_S3_ACCESS_KEY=accesskey
//! export TEST_S3_SECRET_KEY=secretkey
//! export TEST_S3_BUCKET=backup-test
//! cargo test --features integration
//! ```

#![cfg(feature = "integration")]

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Get S3 test configuration from environment
fn get_test_config() -> Option<(String, String, String, String)> {
    let endpoint = std::env::var("TEST_S3_ENDPOINT").ok()?;
    let access_key = std::env::var("TEST_S3_ACCESS_KEY").ok()?;
    let secret_key = std::env::var("TEST_S3_SECRET_KEY").ok()?;
    let bucket = std::env::var("TEST_S3_BUCKET").ok()?;
    Some((endpoint, access_key, secret_key, bucket))
}

/// Generate unique suffix for test resources
fn uuid_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{:x}", duration.as_nanos() % 0xFFFFFFFF)
}

/// Run backup against the test server with `bucket` as the media bucket
fn run_upload(input: &Path, bucket: &str, config_dir: &Path) -> Option<Output> {
    let (endpoint, access_key, secret_key, _) = get_test_config()?;
    let config = config_dir.join("config.toml");
    std::fs::write(
        &config,
        format!("schema_version = 1\n[s3]\nbucket = \"{bucket}\"\nendpoint = \"{endpoint}\"\n"),
    )
    .ok()?;

    let output = Command::new(env!("CARGO_BIN_EXE_backup"))
        .args(["--json", "--config"])
        .arg(&config)
        .args(["upload", "--input-dir"])
        .arg(input)
        .env("AWS_ACCESS_KEY_ID", access_key)
        .env("AWS_SECRET_ACCESS_KEY", secret_key)
        .env_remove("AWS_S3_BUCKET")
        .env_remove("AWS_ENDPOINT_URL")
        .output()
        .expect("Failed to execute backup command");
    Some(output)
}

#[test]
fn test_upload_media_to_s3() {
    let Some((_, _, _, bucket)) = get_test_config() else {
        eprintln!("Skipping: S3 test config not available");
        return;
    };

    let work = TempDir::new().expect("Failed to create temp dir");
    let input = work.path().join("input");
    let name = format!("photo-{}.jpg", uuid_suffix());
    std::fs::create_dir_all(input.join("nested")).unwrap();
    std::fs::write(input.join("nested").join(&name), b"not really a jpeg").unwrap();
    std::fs::write(input.join("notes.txt"), b"ignored").unwrap();

    let output = run_upload(&input, &bucket, work.path()).unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["media"]["status"], "completed");
    assert_eq!(json["media"]["outcomes"][0]["object_name"], name.as_str());
    assert_eq!(json["media"]["outcomes"][0]["uploaded"], true);
    assert_eq!(json["ignored"], 1);
}

#[test]
fn test_missing_bucket_skips_batch() {
    if get_test_config().is_none() {
        eprintln!("Skipping: S3 test config not available");
        return;
    }

    let work = TempDir::new().expect("Failed to create temp dir");
    let input = work.path().join("input");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("a.jpg"), b"x").unwrap();

    let bucket = format!("missing-{}", uuid_suffix());
    let output = run_upload(&input, &bucket, work.path()).unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["media"]["status"], "session_failed");
    assert!(json["media"].get("outcomes").is_none());
}
