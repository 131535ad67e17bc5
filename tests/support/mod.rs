//! Test support utilities for gnoman integration tests.
//!
//! Provides reusable test environment setup and helper commands.

pub mod assertions;
pub mod commands;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;

use std::path::PathBuf;
use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own temporary project dir and vault home dir.
/// No process-global state is mutated; child processes get their
/// environment and `.current_dir()` explicitly, so tests run in parallel.
pub struct Test {
    /// Temporary directory for the test project
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");

        Self { dir, home }
    }

    /// Create a test environment with secrets already stored.
    pub fn with_secrets(secrets: &[(&str, &str)]) -> Self {
        let t = Self::new();
        for (k, v) in secrets {
            let output = t.set(k, v);
            assert!(
                output.status.success(),
                "Failed to set secret {}: {}",
                k,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        t
    }

    /// Vault base directory (`GNOMAN_HOME`).
    pub fn vault_home(&self) -> PathBuf {
        self.home.path().join(".gnoman")
    }

    /// Encrypted-file store location.
    pub fn store_path(&self) -> PathBuf {
        self.vault_home().join("keyring.json")
    }

    /// Audit log location.
    pub fn audit_path(&self) -> PathBuf {
        self.vault_home().join("audit.log")
    }

    /// Write a `.gnoman.toml` into the project directory.
    pub fn write_config(&self, contents: &str) {
        std::fs::write(self.dir.path().join(".gnoman.toml"), contents)
            .expect("failed to write .gnoman.toml");
    }
}
