//! Constants used throughout gnoman.
//!
//! Centralizes file names, environment variable names, and defaults.

/// Project configuration file name (.gnoman.toml).
pub const CONFIG_FILE: &str = ".gnoman.toml";

/// Base directory relative to HOME (~/.gnoman).
pub const HOME_DIR: &str = ".gnoman";

/// Encrypted-file store name inside the base directory.
pub const STORE_FILE: &str = "keyring.json";

/// Audit log name inside the base directory.
pub const AUDIT_LOG_FILE: &str = "audit.log";

/// Audit mask key, stored next to the audit log.
pub const AUDIT_KEY_FILE: &str = "audit.key";

/// Default native service identifier and default namespace.
pub const DEFAULT_SERVICE: &str = "gnoman";

/// Namespace used by the settings layer.
pub const SETTINGS_NAMESPACE: &str = "settings";

/// Default per-call timeout for native keychain calls.
pub const DEFAULT_NATIVE_TIMEOUT_MS: u64 = 5_000;

/// Environment variable names.
pub mod env {
    /// Base directory override.
    pub const HOME: &str = "GNOMAN_HOME";
    /// Encrypted-file store path override.
    pub const VAULT_PATH: &str = "GNOMAN_VAULT_PATH";
    /// Explicit passphrase for file-backend key derivation.
    pub const VAULT_PASSPHRASE: &str = "GNOMAN_VAULT_PASSPHRASE";
    /// Native service identifier override.
    pub const KEYRING_SERVICE: &str = "GNOMAN_KEYRING_SERVICE";
    /// Audit log path override.
    pub const AUDIT_LOG: &str = "GNOMAN_AUDIT_LOG";
    /// Preferred backend at startup.
    pub const BACKEND: &str = "GNOMAN_BACKEND";
    /// Forces interactive-session detection (`1` / `0`).
    pub const INTERACTIVE: &str = "GNOMAN_INTERACTIVE";
    /// Log filter for the binary.
    pub const LOG: &str = "GNOMAN_LOG";
}
