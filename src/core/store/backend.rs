//! Backend construction.
//!
//! The keyring manager never names a concrete backend type. It asks a
//! [`BackendFactory`] for a fresh instance of a [`BackendKind`], which lets
//! tests substitute failing or instrumented backends.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{
    Backend, BackendKind, Credentials, EncryptedFile, KeyMaterial, NativeKeyring, OsCredentials,
    Volatile,
};
use crate::core::config::Config;

/// Builds uninitialized backend instances.
pub trait BackendFactory: Send + Sync {
    fn create(&self, kind: BackendKind) -> Box<dyn Backend>;
}

/// Factory for the three real backends.
#[derive(Clone)]
pub struct StandardBackends {
    service: String,
    native_timeout: Duration,
    credentials: Arc<dyn Credentials>,
    store_path: PathBuf,
    passphrase: Option<String>,
}

impl StandardBackends {
    /// Factory configured from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self {
            service: config.service().to_string(),
            native_timeout: config.native_timeout(),
            credentials: Arc::new(OsCredentials),
            store_path: config.store_path(),
            passphrase: config.passphrase().map(str::to_string),
        }
    }

    /// Replace the native credential store.
    pub fn with_credentials(mut self, credentials: Arc<dyn Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn store_path(&self) -> &PathBuf {
        &self.store_path
    }

    /// Fresh encrypted-file backend over the configured store.
    pub fn encrypted_file(&self) -> EncryptedFile {
        EncryptedFile::new(
            self.store_path.clone(),
            KeyMaterial::from_passphrase_or_host(self.passphrase.as_deref()),
        )
    }

    /// Fresh native backend under the configured service.
    pub fn native(&self) -> NativeKeyring {
        NativeKeyring::with_credentials(
            self.service.clone(),
            self.native_timeout,
            Arc::clone(&self.credentials),
        )
    }
}

impl BackendFactory for StandardBackends {
    fn create(&self, kind: BackendKind) -> Box<dyn Backend> {
        debug!(backend = %kind, "creating backend");
        match kind {
            BackendKind::Native => Box::new(self.native()),
            BackendKind::EncryptedFile => Box::new(self.encrypted_file()),
            BackendKind::Volatile => Box::new(Volatile::new()),
        }
    }
}

impl std::fmt::Debug for StandardBackends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardBackends")
            .field("service", &self.service)
            .field("native_timeout", &self.native_timeout)
            .field("store_path", &self.store_path)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
