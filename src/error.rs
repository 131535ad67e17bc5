//! Error types.
//!
//! Every failure surfaced by the vault is one of these variants. Messages
//! may name a backend, a cascade step or a key, but never a secret value.

use thiserror::Error;

use crate::core::resolver::SecretSource;
use crate::core::store::BackendKind;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl Error {
    /// Whether this is the recoverable BackendUnavailable condition.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Store(StoreError::Unavailable { .. }))
    }
}

/// Storage backend errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{backend} backend unavailable: {reason}")]
    Unavailable { backend: BackendKind, reason: String },

    #[error("no available backend (tried {})", format_attempts(.attempts))]
    NoAvailableBackend { attempts: Vec<(BackendKind, String)> },

    #[error("keyring not initialized: no backend is active")]
    NotInitialized,
}

impl StoreError {
    /// Shorthand for [`StoreError::Unavailable`].
    pub fn unavailable(backend: BackendKind, reason: impl Into<String>) -> Self {
        StoreError::Unavailable {
            backend,
            reason: reason.into(),
        }
    }
}

fn format_attempts(attempts: &[(BackendKind, String)]) -> String {
    if attempts.is_empty() {
        return "nothing".to_string();
    }
    attempts
        .iter()
        .map(|(kind, reason)| format!("{kind}: {reason}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Secret lookup errors.
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("required secret {key} not found (checked: {})", format_sources(.checked))]
    MissingRequired {
        key: String,
        checked: Vec<SecretSource>,
    },

    #[error("secret not found: {0}")]
    NotFound(String),
}

fn format_sources(sources: &[SecretSource]) -> String {
    sources
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadFile(std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unable to determine home directory")]
    NoHomeDir,

    #[error("unknown backend '{0}' (expected native, encrypted-file or volatile)")]
    UnknownBackend(String),

    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Input validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("secret key cannot be empty")]
    EmptyKey,

    #[error("invalid secret key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("invalid namespace '{namespace}': {reason}")]
    InvalidNamespace { namespace: String, reason: String },

    #[error("value for {0} cannot be empty")]
    EmptyValue(String),

    #[error("{path} has permissions {actual}, expected {expected}")]
    InvalidPermissions {
        path: String,
        expected: String,
        actual: String,
    },
}

/// Settings layer errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("unknown setting: {0}")]
    UnknownField(String),

    #[error("invalid value for setting {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
