//! Tests for `gnoman backend`.

use crate::support::*;

#[test]
fn test_shows_active_backend() {
    let t = Test::new();

    let output = t.cmd().arg("backend").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "encrypted-file");
    assert_stdout_contains(&output, "gnoman");
}

#[test]
fn test_switch_saves_preference() {
    let t = Test::new();

    let output = t.cmd().args(["backend", "volatile"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "active backend: volatile");

    let config = std::fs::read_to_string(t.dir.path().join(".gnoman.toml")).unwrap();
    assert!(config.contains("backend = \"volatile\""));
}

#[test]
fn test_volatile_backend_does_not_persist() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["--backend", "volatile", "set", "RPC_URL", "https://x"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stderr_contains(&output, "volatile backend active");

    let output = t
        .cmd()
        .args(["--backend", "volatile", "get", "RPC_URL"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert!(!t.store_path().exists());
}

#[test]
fn test_corrupt_store_falls_back_to_volatile() {
    let t = Test::with_secrets(&[("RPC_URL", "https://x")]);
    std::fs::write(t.store_path(), "{ not json").unwrap();

    let output = t.cmd().arg("backend").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "volatile");

    // The corrupt file is left for the operator, not overwritten.
    let raw = std::fs::read_to_string(t.store_path()).unwrap();
    assert_eq!(raw, "{ not json");
}
