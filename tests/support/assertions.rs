//! Assertions over gnoman process output.

use std::process::Output;

use super::Test;

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Parse stdout of a `--json` invocation.
pub fn stdout_json(output: &Output) -> serde_json::Value {
    assert_success(output);
    serde_json::from_str(&stdout(output))
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", stdout(output)))
}

pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "gnoman exited with {}:\n{}",
        output.status,
        stderr(output)
    );
}

pub fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "gnoman succeeded unexpectedly:\n{}",
        stdout(output)
    );
}

pub fn assert_stdout_contains(output: &Output, expected: &str) {
    let out = stdout(output);
    assert!(out.contains(expected), "stdout missing {expected:?}:\n{out}");
}

pub fn assert_stderr_contains(output: &Output, expected: &str) {
    let err = stderr(output);
    assert!(err.contains(expected), "stderr missing {expected:?}:\n{err}");
}

/// Neither stream mentions `secret`.
pub fn assert_no_leak(output: &Output, secret: &str) {
    for (name, text) in [("stdout", stdout(output)), ("stderr", stderr(output))] {
        assert!(!text.contains(secret), "{name} leaks {secret:?}:\n{text}");
    }
}

/// `set` then `get` returns the value unchanged.
pub fn assert_roundtrip(t: &Test, key: &str, value: &str) {
    assert_success(&t.set(key, value));

    let output = t.get(key);
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), value, "roundtrip of {key}");
}
