//! Binary tests: `splitmap assess` and `splitmap init`.

mod common;

use assert_cmd::Command;
use common::{write_fixture, SHOP_FACTS};
use serde_json::Value;
use tempfile::TempDir;

fn splitmap() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_splitmap"));
    cmd.env_remove("SPLITMAP_LOG");
    cmd
}

#[test]
fn test_assess_prints_result_json() {
    let dir = TempDir::new().unwrap();
    let facts = write_fixture(dir.path(), "shop.jsonl", SHOP_FACTS);

    let output = splitmap()
        .current_dir(dir.path())
        .args(["assess", "--team-size", "6"])
        .arg(&facts)
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["verdict"]["status"], "proceed");
    assert_eq!(json["clusters"].as_array().unwrap().len(), 2);
    assert!(json["migration_plan"]["waves"].is_array());
    assert_eq!(json["ingestion"]["accepted"], 17);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PROCEED"));
}

#[test]
fn test_assess_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let facts = write_fixture(dir.path(), "shop.jsonl", SHOP_FACTS);
    let out = dir.path().join("result.json");

    splitmap()
        .current_dir(dir.path())
        .args(["assess", "--team-size", "2", "--compact", "--output"])
        .arg(&out)
        .arg(&facts)
        .assert()
        .success();

    let contents = std::fs::read_to_string(&out).unwrap();
    assert_eq!(contents.lines().count(), 1);
    let json: Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(json["verdict"]["status"], "do_not_proceed");
    assert!(json["migration_plan"].is_null());
}

#[test]
fn test_assess_fails_on_empty_input() {
    let dir = TempDir::new().unwrap();
    let facts = write_fixture(dir.path(), "empty.jsonl", "not json\n");

    let output = splitmap()
        .current_dir(dir.path())
        .args(["assess", "--team-size", "6"])
        .arg(&facts)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("E030"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_assess_reports_missing_fact_file() {
    let dir = TempDir::new().unwrap();

    splitmap()
        .current_dir(dir.path())
        .args(["assess", "--team-size", "6", "missing.jsonl"])
        .assert()
        .failure();
}

#[test]
fn test_init_then_assess_with_discovered_config() {
    let dir = TempDir::new().unwrap();

    splitmap()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    assert!(dir.path().join(".splitmap.toml").is_file());

    splitmap()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure();

    let facts = write_fixture(dir.path(), "shop.jsonl", SHOP_FACTS);
    splitmap()
        .current_dir(dir.path())
        .args(["assess", "--team-size", "6", "--preset", "small"])
        .arg(&facts)
        .assert()
        .success();
}

#[test]
fn test_invalid_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(dir.path(), "bad.toml", "[weights]\nshared_tables = -1.0\n");
    let facts = write_fixture(dir.path(), "shop.jsonl", SHOP_FACTS);

    let output = splitmap()
        .current_dir(dir.path())
        .args(["assess", "--team-size", "6", "--config"])
        .arg(&config)
        .arg(&facts)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("shared_tables"));
}
