//! Binary-level checks that need no warehouse.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn querypilot(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("querypilot").unwrap();
    cmd.current_dir(dir)
        .env_remove("DATABRICKS_SERVER_HOSTNAME")
        .env_remove("DATABRICKS_HTTP_PATH")
        .env_remove("DATABRICKS_TOKEN")
        .env_remove("RUST_LOG")
        .env("HOME", dir)
        .arg("--no-color")
        .arg("--no-spinner")
        .arg("--config")
        .arg(dir.join("config.toml"));
    cmd
}

#[test]
fn test_missing_credentials_is_reported() {
    let dir = tempdir().unwrap();

    querypilot(dir.path())
        .arg("-c")
        .arg("SELECT 1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing warehouse credentials"))
        .stderr(predicate::str::contains("DATABRICKS_TOKEN"));
}

#[test]
fn test_partial_env_file_names_the_missing_value() {
    let dir = tempdir().unwrap();
    let env_file = dir.path().join("warehouse.env");
    std::fs::write(
        &env_file,
        "DATABRICKS_SERVER_HOSTNAME=adb-1.azuredatabricks.net\nDATABRICKS_HTTP_PATH=/sql/1.0/warehouses/abc\n",
    )
    .unwrap();

    querypilot(dir.path())
        .arg("--env-file")
        .arg(&env_file)
        .arg("--metric")
        .arg("rides")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABRICKS_TOKEN"))
        .stderr(predicate::str::contains("DATABRICKS_HTTP_PATH").not());
}

#[test]
fn test_unknown_metric_fails_before_connecting() {
    let dir = tempdir().unwrap();

    querypilot(dir.path())
        .arg("--metric")
        .arg("churn")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown metric 'churn'"));
}

#[test]
fn test_missing_env_file_is_configuration_error() {
    let dir = tempdir().unwrap();

    querypilot(dir.path())
        .arg("--env-file")
        .arg(dir.path().join("absent.env"))
        .arg("-c")
        .arg("SELECT 1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load env file"));
}

#[test]
fn test_version_flag() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("querypilot")
        .unwrap()
        .current_dir(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("querypilot"));
}
