//! Command helper methods for Test.

use super::{Test, TEST_PASSPHRASE};
use assert_cmd::Command;
use std::process::Output;

/// Variables that must never leak from the developer's shell into tests.
const SCRUBBED: &[&str] = &[
    "GNOMAN_LOG",
    "GNOMAN_VAULT_PATH",
    "GNOMAN_KEYRING_SERVICE",
    "GNOMAN_AUDIT_LOG",
    "ETHERSCAN_API_KEY",
    "RPC_URL",
];

impl Test {
    /// Create a gnoman command with an isolated environment.
    ///
    /// Returns a Command configured with:
    /// - HOME and GNOMAN_HOME inside the temporary home directory
    /// - the encrypted-file backend and a fixed passphrase
    /// - no interactive session, so the native keychain is never touched
    /// - current directory set to the test project directory
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("gnoman").expect("failed to find gnoman binary");
        for var in SCRUBBED {
            cmd.env_remove(var);
        }
        cmd.env("HOME", self.home.path());
        // Windows uses USERPROFILE instead of HOME for home directory
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("GNOMAN_HOME", self.vault_home());
        cmd.env("GNOMAN_BACKEND", "encrypted-file");
        cmd.env("GNOMAN_VAULT_PASSPHRASE", TEST_PASSPHRASE);
        cmd.env("GNOMAN_INTERACTIVE", "0");
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `gnoman set` command.
    pub fn set(&self, key: &str, val: &str) -> Output {
        self.cmd()
            .args(["set", key, val])
            .output()
            .expect("failed to run gnoman set")
    }

    /// Shortcut for `gnoman set` with the value piped on stdin.
    pub fn set_stdin(&self, key: &str, val: &str) -> Output {
        self.cmd()
            .args(["set", key])
            .write_stdin(format!("{}\n", val))
            .output()
            .expect("failed to run gnoman set")
    }

    /// Shortcut for `gnoman get` command.
    pub fn get(&self, key: &str) -> Output {
        self.cmd()
            .args(["get", key])
            .output()
            .expect("failed to run gnoman get")
    }

    /// Shortcut for `gnoman rm` command.
    pub fn rm(&self, key: &str) -> Output {
        self.cmd()
            .args(["rm", key])
            .output()
            .expect("failed to run gnoman rm")
    }

    /// Shortcut for `gnoman list` command.
    pub fn list(&self) -> Output {
        self.cmd()
            .arg("list")
            .output()
            .expect("failed to run gnoman list")
    }

    /// Shortcut for `gnoman list --json` command.
    pub fn list_json(&self) -> Output {
        self.cmd()
            .args(["list", "--json"])
            .output()
            .expect("failed to run gnoman list --json")
    }

    /// Shortcut for `gnoman resolve` with extra arguments.
    pub fn resolve(&self, key: &str, extra: &[&str]) -> Output {
        self.cmd()
            .args(["resolve", key])
            .args(extra)
            .output()
            .expect("failed to run gnoman resolve")
    }

    /// Shortcut for `gnoman settings ...`.
    pub fn settings(&self, args: &[&str]) -> Output {
        self.cmd()
            .arg("settings")
            .args(args)
            .output()
            .expect("failed to run gnoman settings")
    }

    /// Shortcut for `gnoman audit` command.
    pub fn audit(&self) -> Output {
        self.cmd()
            .arg("audit")
            .output()
            .expect("failed to run gnoman audit")
    }
}
