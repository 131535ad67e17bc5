//! Vault context.
//!
//! Constructed once at process start and handed to every consumer. It owns
//! the configuration, the backend factory and the keyring manager, and
//! builds resolvers and settings stores on demand.

use tracing::info;

use crate::core::audit::AuditLog;
use crate::core::config::Config;
use crate::core::env::Environment;
use crate::core::keyring::KeyringManager;
use crate::core::resolver::SecretResolver;
use crate::core::settings::SettingsStore;
use crate::core::store::{BackendKind, StandardBackends};
use crate::error::Result;

pub struct Vault {
    config: Config,
    env: Environment,
    backends: StandardBackends,
    keyring: KeyringManager,
}

impl Vault {
    /// Open the vault with the standard backends and activate the
    /// preferred backend, falling back along the cascade.
    ///
    /// # Errors
    ///
    /// `StoreError::NoAvailableBackend` if no backend at or after the
    /// preferred one initializes.
    pub async fn open(config: Config, env: Environment) -> Result<Self> {
        let backends = StandardBackends::from_config(&config);
        Self::with_backends(config, env, backends).await
    }

    /// Open the vault over a specific factory configuration.
    pub async fn with_backends(
        config: Config,
        env: Environment,
        backends: StandardBackends,
    ) -> Result<Self> {
        let audit = AuditLog::open(config.audit_log_path()).await?;
        let keyring = KeyringManager::new(backends.clone(), config.namespace(), audit)?;

        let preferred = config.preferred_backend();
        let active = keyring.switch_backend(preferred).await?;
        info!(preferred = %preferred, active = %active, "vault open");

        Ok(Self {
            config,
            env,
            backends,
            keyring,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn keyring(&self) -> &KeyringManager {
        &self.keyring
    }

    pub fn settings(&self) -> SettingsStore<'_> {
        SettingsStore::new(&self.keyring)
    }

    /// A fresh resolution cascade with its own store instances.
    pub fn resolver(&self) -> SecretResolver {
        SecretResolver::from_config(&self.config, &self.env, &self.backends)
    }

    pub async fn active_backend(&self) -> Option<BackendKind> {
        self.keyring.active_backend().await
    }

    /// Shut down every backend.
    pub async fn close(self) -> Result<()> {
        self.keyring.shutdown().await
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("backends", &self.backends)
            .finish_non_exhaustive()
    }
}
