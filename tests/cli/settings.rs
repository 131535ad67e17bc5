//! Tests for `gnoman settings`.

use crate::support::*;

#[test]
fn test_show_defaults() {
    let t = Test::new();

    let output = t.settings(&["show", "--json"]);
    assert_success(&output);
    let json = stdout_json(&output);
    assert_eq!(json["chain_id"], 1);
    assert_eq!(json["etherscan_base_url"], "https://api.etherscan.io/api");
    assert_eq!(json["poll_interval_secs"], 30);
    assert!(json["rpc_url"].is_null());
}

#[test]
fn test_set_and_get_field() {
    let t = Test::new();

    assert_success(&t.settings(&["set", "safe_address", SAFE_ADDRESS]));
    let output = t.settings(&["get", "safe_address"]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), SAFE_ADDRESS);
}

#[test]
fn test_invalid_value_rejected() {
    let t = Test::new();

    let output = t.settings(&["set", "chain_id", "mainnet"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid value for setting chain_id");
}

#[test]
fn test_unknown_field_rejected() {
    let t = Test::new();

    let output = t.settings(&["get", "colour"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "unknown setting: colour");
}

#[test]
fn test_reset() {
    let t = Test::new();
    assert_success(&t.settings(&["set", "poll_interval_secs", "5"]));
    assert_success(&t.settings(&["reset"]));

    let output = t.settings(&["get", "poll_interval_secs"]);
    assert_eq!(stdout(&output).trim_end(), "30");
}

#[test]
fn test_settings_do_not_appear_in_default_namespace() {
    let t = Test::new();
    assert_success(&t.settings(&["set", "rpc_url", "https://rpc.example"]));

    let output = t.list();
    assert_stdout_contains(&output, "no secrets stored");
}
