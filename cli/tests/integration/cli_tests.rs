//! Integration tests for CLI structure, argument parsing, and config loading.

#![allow(clippy::expect_used)]

use std::io::Write as _;

use assert_cmd::Command;
use predicates::prelude::*;

fn cdp_dev() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cdp-dev"));
    cmd.env("NO_COLOR", "1")
        .env_remove("CI")
        .env_remove("CDP_DEV_YES")
        .env_remove("CDP_DEV_LOG");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    cdp_dev()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("disposable Kind cluster"));
}

#[test]
fn test_cli_help_lists_every_command() {
    let assert = cdp_dev().arg("--help").assert().success();
    let mut stdout = predicate::str::contains("Usage:").boxed();
    for command in ["install", "start", "stop", "status", "logs", "destroy", "doctor"] {
        stdout = stdout.and(predicate::str::contains(command)).boxed();
    }
    assert.stdout(stdout);
}

#[test]
fn test_cli_version_flag_shows_version() {
    cdp_dev()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "cdp-dev ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_cli_unknown_subcommand_fails() {
    cdp_dev()
        .arg("provision")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_install_help_documents_skip_preflight() {
    cdp_dev()
        .args(["install", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--skip-preflight"));
}

// --- logs argument validation ---

#[test]
fn test_logs_rejects_unknown_service() {
    cdp_dev()
        .args(["logs", "postgres"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value 'postgres'"))
        .stderr(predicate::str::contains("scheduler"));
}

#[test]
fn test_logs_help_shows_defaults() {
    cdp_dev()
        .args(["logs", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: airflow]"))
        .stdout(predicate::str::contains("[default: 50]"))
        .stdout(predicate::str::contains("--no-follow"));
}

#[test]
fn test_logs_rejects_non_numeric_lines() {
    cdp_dev()
        .args(["logs", "-n", "many"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value 'many'"));
}

// --- configuration ---

#[test]
fn test_unparsable_config_fails_before_any_command_runs() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "readiness_timeout_secs: [not, a, number]").expect("write config");

    cdp_dev()
        .env("CDP_DEV_CONFIG", file.path())
        .arg("status")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"))
        .stderr(predicate::str::contains("cannot parse"));
}

// --- destroy confirmation ---

#[test]
fn test_destroy_without_terminal_or_yes_refuses() {
    let dir = tempfile::tempdir().expect("temp dir");
    cdp_dev()
        .env("CDP_DEV_CONFIG", dir.path().join("absent.yaml"))
        .arg("destroy")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("permanently remove"))
        .stderr(predicate::str::contains("pass --yes"));
}

#[test]
fn test_json_mode_failure_prints_error_object() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "helm_timeout: {{").expect("write config");

    let output = cdp_dev()
        .env("CDP_DEV_CONFIG", file.path())
        .args(["--json", "status"])
        .output()
        .expect("run cdp-dev");

    assert_eq!(output.status.code(), Some(1));
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json on stdout");
    assert_eq!(doc["error"], true);
    assert!(
        doc["message"]
            .as_str()
            .is_some_and(|m| m.contains("cannot parse"))
    );
}
