//! Tests for error handling and CLI flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("gnoman") || out.contains("Usage"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "gnoman");
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let t = Test::with_secrets(&[("RPC_URL", "https://x")]);

    let output = t
        .cmd()
        .args(["--verbose", "get", "RPC_URL"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "https://x");
    assert_stderr_contains(&output, "vault open");
}

#[test]
fn test_unknown_backend_rejected() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["--backend", "floppy", "list"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "floppy");
}

#[test]
fn test_empty_value_rejected() {
    let t = Test::new();

    let output = t.set("RPC_URL", "");
    assert_failure(&output);
    assert_stderr_contains(&output, "cannot be empty");
}

#[test]
fn test_invalid_namespace_rejected() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["--namespace", "a:b", "list"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid namespace");
}

#[test]
fn test_malformed_config_rejected() {
    let t = Test::new();
    t.write_config("[vault\n");

    let output = t.list();
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid config");
}

#[test]
fn test_completions() {
    let t = Test::new();

    let output = t.cmd().args(["completions", "bash"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "gnoman");
}

#[test]
fn test_missing_secret_suggests_set() {
    let t = Test::new();

    t.cmd()
        .args(["get", "DEPLOYER_KEY"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("DEPLOYER_KEY"))
        .stderr(predicate::str::contains("gnoman set"));
}

#[test]
fn test_unknown_backend_lists_valid_names() {
    let t = Test::new();

    t.cmd()
        .env("GNOMAN_BACKEND", "floppy")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("floppy"));
}

#[test]
fn test_errors_never_echo_values() {
    let t = Test::with_secrets(&[("SAFE_OWNER", "0xdeadbeefcafe0000")]);

    t.cmd()
        .args(["--namespace", "a:b", "get", "SAFE_OWNER"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("0xdeadbeefcafe0000").not());
}
