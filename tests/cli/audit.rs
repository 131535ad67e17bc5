//! Tests for the audit trail written by CLI operations.

use crate::support::*;
use std::fs;

#[test]
fn test_operations_are_audited_without_leaking() {
    let t = Test::with_secrets(&[("ETHERSCAN_API_KEY", "YOURAPIKEYTOKEN1234567890")]);
    assert_success(&t.get("ETHERSCAN_API_KEY"));
    assert_success(&t.list());

    let log = fs::read_to_string(t.audit_path()).unwrap();
    assert!(!log.contains("ETHERSCAN_API_KEY"));
    assert!(!log.contains("YOURAPIKEYTOKEN"));
    assert!(log.contains("\tset\t"));
    assert!(log.contains("\tget\t"));
    assert!(log.contains("\tlist\t"));
    assert!(log.contains("\tswitch\t"));
    assert!(t.vault_home().join("audit.key").exists());
}

#[test]
fn test_same_key_masks_to_same_token_across_runs() {
    let t = Test::with_secrets(&[("RPC_URL", "https://x")]);
    assert_success(&t.get("RPC_URL"));

    let log = fs::read_to_string(t.audit_path()).unwrap();
    let tokens: Vec<&str> = log
        .lines()
        .filter(|l| l.contains("\tset\t") || l.contains("\tget\t"))
        .map(|l| l.split('\t').nth(3).unwrap())
        .collect();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0], tokens[1]);
    assert!(tokens[0].starts_with("k_"));
}

#[test]
fn test_audit_command_shows_tail() {
    let t = Test::with_secrets(&[("RPC_URL", "https://x")]);

    let output = t.audit();
    assert_success(&output);
    assert_stdout_contains(&output, "audit records");
    assert_stdout_contains(&output, "encrypted-file");
    assert_no_leak(&output, "RPC_URL");
}

#[test]
fn test_audit_command_without_log() {
    let t = Test::new();
    let output = t.audit();
    assert_success(&output);
    assert_stdout_contains(&output, "no audit records");
}

#[test]
fn test_audit_lines_flag_limits_output() {
    let t = Test::with_secrets(&[("RPC_URL", "https://x"), ("SAFE_OWNER", "0x1")]);
    assert_success(&t.get("RPC_URL"));

    let output = t.cmd().args(["audit", "-l", "2"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "2 audit records");
}

#[test]
fn test_namespace_short_flag_coexists_with_audit() {
    let t = Test::with_secrets(&[("RPC_URL", "https://x")]);

    let output = t
        .cmd()
        .args(["-n", "gnoman", "audit", "--lines", "1"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "1 audit record");
}
