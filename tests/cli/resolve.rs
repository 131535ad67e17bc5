//! Tests for `gnoman resolve`.

use crate::support::*;

#[test]
fn test_env_source() {
    let t = Test::new();

    let output = t
        .cmd()
        .env("ETHERSCAN_API_KEY", "from-env")
        .args(["resolve", "ETHERSCAN_API_KEY"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "env");
    assert_no_leak(&output, "from-env");
}

#[test]
fn test_project_file_beats_store() {
    let t = Test::with_secrets(&[("RPC_URL", "https://from-store")]);
    t.write_config("[secrets]\nRPC_URL = \"https://from-project\"\n");

    let output = t.resolve("RPC_URL", &["--reveal"]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "https://from-project");

    let output = t.resolve("RPC_URL", &["--json"]);
    let json = stdout_json(&output);
    assert_eq!(json["source"], "project-file");
    assert_eq!(json["checked"], serde_json::json!(["env", "project-file"]));
    assert!(json.get("value").is_none());
}

#[test]
fn test_store_source() {
    let t = Test::with_secrets(&[("RPC_URL", "https://from-store")]);

    let output = t.resolve("RPC_URL", &["--json", "--reveal"]);
    assert_success(&output);
    let json = stdout_json(&output);
    assert_eq!(json["source"], "encrypted-file");
    assert_eq!(json["value"], "https://from-store");
}

#[test]
fn test_missing_required_fails_closed() {
    let t = Test::new();

    let output = t.resolve("ETHERSCAN_API_KEY", &["--required"]);
    assert_failure(&output);
    assert_stderr_contains(
        &output,
        "required secret ETHERSCAN_API_KEY not found (checked: env, project-file, encrypted-file)",
    );
}

#[test]
fn test_missing_required_without_fail_closed() {
    let t = Test::new();

    let output = t.resolve("ETHERSCAN_API_KEY", &["--required", "--no-fail-closed", "--json"]);
    assert_success(&output);
    let json = stdout_json(&output);
    assert_eq!(json["source"], "missing");
    assert_eq!(json["checked"].as_array().unwrap().len(), 3);
}

#[test]
fn test_native_skipped_outside_interactive_session() {
    let t = Test::new();

    let output = t.resolve("ETHERSCAN_API_KEY", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "missing");
    assert_stdout_contains(&output, "native keychain skipped");
}

#[test]
fn test_namespace_flag_applies_to_resolve() {
    let t = Test::new();
    assert_success(
        &t.cmd()
            .args(["--namespace", "safe", "set", "OWNER", "0xabc"])
            .output()
            .unwrap(),
    );

    let output = t
        .cmd()
        .args(["--namespace", "safe", "resolve", "OWNER", "--json", "--reveal"])
        .output()
        .unwrap();
    assert_success(&output);
    let json = stdout_json(&output);
    assert_eq!(json["source"], "encrypted-file");
    assert_eq!(json["value"], "0xabc");

    let output = t.resolve("OWNER", &["--json"]);
    let json = stdout_json(&output);
    assert_eq!(json["source"], "missing");
}

#[test]
fn test_invalid_namespace_rejected_by_resolve() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["--namespace", "a:b", "resolve", "OWNER"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid namespace");
}
