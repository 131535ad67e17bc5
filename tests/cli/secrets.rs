//! Tests for `gnoman set/get/rm/list` commands.

use crate::support::*;
use std::fs;

#[test]
fn test_set_and_get_roundtrip() {
    let t = Test::new();

    let output = t.set("RPC_URL", "https://mainnet.infura.io/v3/abc");
    assert_success(&output);
    assert_stdout_contains(&output, "RPC_URL");

    let output = t.get("RPC_URL");
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "https://mainnet.infura.io/v3/abc");
}

#[test]
fn test_standard_secrets_roundtrip() {
    let t = Test::new();
    for (key, value) in STANDARD_SECRETS {
        assert_roundtrip(&t, key, value);
    }
}

#[test]
fn test_set_overwrites() {
    let t = Test::with_secrets(&[("ETHERSCAN_API_KEY", "old")]);

    assert_success(&t.set("ETHERSCAN_API_KEY", "new"));
    let output = t.get("ETHERSCAN_API_KEY");
    assert_eq!(stdout(&output).trim_end(), "new");
}

#[test]
fn test_set_reads_piped_stdin() {
    let t = Test::new();

    let output = t.set_stdin("DEPLOYER_KEY", "0xdeadbeef");
    assert_success(&output);

    let output = t.get("DEPLOYER_KEY");
    assert_eq!(stdout(&output).trim_end(), "0xdeadbeef");
}

#[test]
fn test_get_missing_fails_with_hint() {
    let t = Test::new();

    let output = t.get("NOPE");
    assert_failure(&output);
    assert_stderr_contains(&output, "secret not found: NOPE");
    assert_stderr_contains(&output, "gnoman set");
}

#[test]
fn test_rm() {
    let t = Test::with_secrets(&[("RPC_URL", "https://x")]);

    let output = t.rm("RPC_URL");
    assert_success(&output);
    assert_stdout_contains(&output, "removed");

    assert_failure(&t.get("RPC_URL"));
    assert_failure(&t.rm("RPC_URL"));
}

#[test]
fn test_list_masks_values() {
    let t = Test::with_secrets(STANDARD_SECRETS);

    let output = t.list();
    assert_success(&output);
    assert_stdout_contains(&output, "4 secrets in gnoman");
    assert_stdout_contains(&output, "ETHERSCAN_API_KEY");
    assert_stdout_contains(&output, "YOUR••••");
    assert_no_leak(&output, "YOURAPIKEYTOKEN1234567890");
    assert_no_leak(&output, "infura");
}

#[test]
fn test_list_json() {
    let t = Test::with_secrets(&[("RPC_URL", "https://x")]);

    let output = t.list_json();
    assert_success(&output);
    let json = stdout_json(&output);
    assert_eq!(json["count"], 1);
    assert_eq!(json["backend"], "encrypted-file");
    assert_eq!(json["secrets"][0]["key"], "RPC_URL");
    assert_eq!(json["secrets"][0]["preview"], "••••");
}

#[test]
fn test_list_empty() {
    let t = Test::new();
    let output = t.list();
    assert_success(&output);
    assert_stdout_contains(&output, "no secrets stored");
}

#[test]
fn test_namespace_flag_isolates_secrets() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["--namespace", "safe", "set", "OWNER", "0xabc"])
        .output()
        .unwrap();
    assert_success(&output);

    assert_failure(&t.get("OWNER"));
    let output = t
        .cmd()
        .args(["get", "OWNER", "-n", "safe"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "0xabc");
}

#[test]
fn test_store_file_is_encrypted() {
    let t = Test::with_secrets(&[("ETHERSCAN_API_KEY", "YOURAPIKEYTOKEN1234567890")]);

    let raw = fs::read_to_string(t.store_path()).unwrap();
    assert!(!raw.contains("ETHERSCAN_API_KEY"));
    assert!(!raw.contains("YOURAPIKEYTOKEN"));

    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["version"], 1);
    for field in ["salt", "nonce", "authTag", "data"] {
        assert!(doc[field].is_string(), "missing {}", field);
    }
}

#[test]
fn test_wrong_passphrase_cannot_read_store() {
    let t = Test::with_secrets(&[("RPC_URL", "https://x")]);

    // The file backend fails authentication and the cascade falls through
    // to the volatile backend, which has nothing.
    let output = t
        .cmd()
        .env("GNOMAN_VAULT_PASSPHRASE", "wrong")
        .args(["get", "RPC_URL"])
        .output()
        .unwrap();
    assert_failure(&output);

    // The store itself is untouched.
    assert_success(&t.get("RPC_URL"));
}

#[cfg(unix)]
#[test]
fn test_store_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let t = Test::with_secrets(&[("RPC_URL", "https://x")]);
    let mode = fs::metadata(t.store_path()).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
    let mode = fs::metadata(t.vault_home()).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o700);
}
