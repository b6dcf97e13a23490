//! CLI output integration tests.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG: &str = r#"
[network]
rpc_url = "http://127.0.0.1:8545"
chain_id = 31337

[contracts]
marketplace = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
activity = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512"

[activity]
secrets_slot = 0
secrets_version = 1712345678
subscription_id = 42
"#;

/// Runs inside an empty directory so no `.env` or `config.toml` leaks in.
fn nftlend(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("nftlend");
    cmd.current_dir(dir.path())
        .env_remove("WALLET_PRIVATE_KEY")
        .env_remove("IDENTITY_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn with_config(contents: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), contents).unwrap();
    dir
}

#[test]
fn test_help() {
    let dir = tempfile::tempdir().unwrap();
    nftlend(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("nftlend"))
        .stdout(predicate::str::contains("sale"))
        .stdout(predicate::str::contains("loan"))
        .stdout(predicate::str::contains("activity"));
}

#[test]
fn test_version() {
    let dir = tempfile::tempdir().unwrap();
    nftlend(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nftlend"));
}

#[test]
fn test_loan_help_lists_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    nftlend(&dir)
        .args(["loan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fund"))
        .stdout(predicate::str::contains("repay"))
        .stdout(predicate::str::contains("liquidate"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    nftlend(&dir)
        .args(["check", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn test_check_config_reports_contracts() {
    let dir = with_config(CONFIG);
    nftlend(&dir)
        .args(["--color", "never", "check", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains(
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
        ))
        .stdout(predicate::str::contains("Wallet not configured"));
}

#[test]
fn test_check_config_json() {
    let dir = with_config(CONFIG);
    let output = nftlend(&dir)
        .args(["--json", "check", "config"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["command"], "check.config");
    assert_eq!(value["result"]["chain_id"], 31337);
    assert_eq!(value["result"]["activity_parameters_set"], true);
    assert!(value["result"]["wallet"].is_null());
}

#[test]
fn test_check_config_rejects_bad_rpc_url() {
    let dir = with_config("[network]\nrpc_url = \"nowhere\"\n");
    nftlend(&dir)
        .args(["check", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("network.rpc_url"));
}

#[test]
fn test_explicit_config_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.toml");
    std::fs::write(&path, CONFIG).unwrap();

    nftlend(&dir)
        .args(["--json", "--config"])
        .arg(&path)
        .args(["check", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"check.config\""));
}

#[test]
fn test_sale_list_needs_marketplace() {
    let dir = with_config("[network]\nchain_id = 31337\n");
    nftlend(&dir)
        .args(["sale", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("contracts.marketplace"));
}

#[test]
fn test_invalid_asset_id_is_a_usage_error() {
    let dir = with_config(CONFIG);
    nftlend(&dir)
        .args(["sale", "info", "abc"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_negative_sale_price_is_rejected_locally() {
    let dir = with_config(CONFIG);
    nftlend(&dir)
        .args(["sale", "create", "1", "--price-usd", "-5"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("price must be positive"));
}
