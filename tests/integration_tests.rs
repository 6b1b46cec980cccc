//! Integration tests for the gh-environments CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A command with no ambient credentials, config or `gh` binary
fn isolated(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gh-environments").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("PATH", "")
        .env_remove("GH_TOKEN")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GH_ENTERPRISE_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("gh-environments").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("secrets"))
        .stdout(predicate::str::contains("variables"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("gh-environments").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gh-environments"));
}

#[test]
fn test_invalid_subcommand() {
    let mut cmd = Command::cargo_bin("gh-environments").unwrap();
    cmd.arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_secrets_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("gh-environments").unwrap();
    cmd.args(["secrets", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("create"));
}

#[test]
fn test_create_with_missing_file_fails_before_auth() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .args(["create", "acme", "-f", "nope.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open nope.csv"));
}

#[test]
fn test_list_without_credentials_fails() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .args(["list", "acme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to authenticate"));

    assert!(fs::read_dir(dir.path()).unwrap().all(|e| {
        !e.unwrap()
            .file_name()
            .to_string_lossy()
            .starts_with("report-")
    }));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .args(["--config", "absent.toml", "variables", "list", "acme", "-t", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_invalid_page_size_from_environment_fails() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .env("GH_ENVIRONMENTS_GITHUB__PAGE_SIZE", "0")
        .args(["list", "acme", "-t", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("page_size"));
}

#[test]
fn test_project_config_file_is_read() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("gh-environments.toml"),
        "[github]\nhostname = \"\"\n",
    )
    .unwrap();

    isolated(&dir)
        .args(["secrets", "list", "acme", "-t", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hostname"));
}
