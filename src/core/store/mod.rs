//! Secret storage backends.
//!
//! Every storage mechanism implements the [`Backend`] trait. Callers never
//! address a backend directly; the keyring manager owns the active one and
//! the resolution cascade probes its own instances.
//!
//! ## Backends
//!
//! - **native**: the operating system credential manager (`keyring` crate).
//!   Unavailable in most headless and CI environments.
//! - **encrypted-file**: AES-256-GCM encrypted JSON document on disk.
//! - **volatile**: in-process map, the terminal fallback.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `Backend` trait in a new file
//! 2. Add a variant to [`BackendKind`] and place it in [`BackendKind::CASCADE`]
//! 3. Construct it in [`StandardBackends::create`]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::core::types::{SecretId, SecretValue};
use crate::error::{ConfigError, Result};

mod backend;
mod fs;
mod keychain;
mod memory;

pub use backend::{BackendFactory, StandardBackends};
pub use fs::{open_store, seal_store, EncryptedFile, KeyMaterial, PersistedStore, STORE_VERSION};
pub use keychain::{Credentials, NativeKeyring, OsCredentials};
pub use memory::Volatile;

/// Identity of a storage mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    Native,
    EncryptedFile,
    Volatile,
}

impl BackendKind {
    /// Fixed fallback preference order.
    pub const CASCADE: [BackendKind; 3] = [
        BackendKind::Native,
        BackendKind::EncryptedFile,
        BackendKind::Volatile,
    ];

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Native => "native",
            BackendKind::EncryptedFile => "encrypted-file",
            BackendKind::Volatile => "volatile",
        }
    }

    fn position(self) -> usize {
        match self {
            BackendKind::Native => 0,
            BackendKind::EncryptedFile => 1,
            BackendKind::Volatile => 2,
        }
    }

    /// This backend followed by every backend after it in the cascade.
    pub fn cascade_from(self) -> &'static [BackendKind] {
        &Self::CASCADE[self.position()..]
    }

    /// The next backend in the cascade, if any.
    pub fn successor(self) -> Option<BackendKind> {
        Self::CASCADE.get(self.position() + 1).copied()
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "keychain" | "keyring" => Ok(BackendKind::Native),
            "encrypted-file" | "encrypted_file" | "file" => Ok(BackendKind::EncryptedFile),
            "volatile" | "memory" => Ok(BackendKind::Volatile),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Backend capability contract.
///
/// Any operation may fail with `StoreError::Unavailable` when the mechanism
/// cannot currently serve requests. All other errors are unexpected and
/// propagate as-is.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Which mechanism this is.
    fn kind(&self) -> BackendKind;

    /// Verify the backend is usable and load any persisted state.
    ///
    /// Idempotent: calling it again re-verifies and reloads.
    async fn initialize(&mut self) -> Result<()>;

    /// Look up a secret.
    async fn get(&mut self, id: &SecretId) -> Result<Option<SecretValue>>;

    /// Create or replace a secret.
    async fn set(&mut self, id: &SecretId, value: &str) -> Result<()>;

    /// Remove a secret. Returns `true` if something was removed.
    async fn delete(&mut self, id: &SecretId) -> Result<bool>;

    /// Every entry in the backend.
    async fn list(&mut self) -> Result<BTreeMap<SecretId, SecretValue>>;

    /// Release resources. The default does nothing.
    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}
