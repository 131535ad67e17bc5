//! Configuration management.
//!
//! Reads the optional project-local `.gnoman.toml` and layers environment
//! overrides on top of it. The `[secrets]` table of the same file is the
//! project-local plaintext source of the resolution cascade.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::core::constants::{self, env as vars};
use crate::core::env::Environment;
use crate::core::store::BackendKind;
use crate::core::validation;
use crate::error::{ConfigError, Result};

/// Project configuration stored in `.gnoman.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Vault settings.
    #[serde(default)]
    pub vault: VaultSection,
    /// Project-local plaintext secrets.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub secrets: BTreeMap<String, String>,
    /// Resolved runtime paths and overrides. Not persisted.
    #[serde(skip)]
    runtime: Runtime,
}

/// `[vault]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultSection {
    /// Preferred backend; the cascade starts here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendKind>,
    /// Default namespace. Falls back to the native service identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Encrypted-file store location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    /// Audit log location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<PathBuf>,
    /// Per-call timeout for native keychain calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default)]
struct Runtime {
    home: PathBuf,
    project_file: PathBuf,
    service: String,
    passphrase: Option<String>,
    store_override: Option<PathBuf>,
    audit_override: Option<PathBuf>,
    backend_override: Option<BackendKind>,
}

impl Config {
    /// Load configuration from `.gnoman.toml` in `dir` (if present) and
    /// apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed, or
    /// `ConfigError::NoHomeDir` if no base directory can be determined.
    pub fn load_from(dir: &Path, env: &Environment) -> Result<Self> {
        let project_file = dir.join(constants::CONFIG_FILE);
        debug!(path = %project_file.display(), "loading config");

        let mut config: Self = if project_file.exists() {
            let contents =
                std::fs::read_to_string(&project_file).map_err(ConfigError::ReadFile)?;
            toml::from_str(&contents).map_err(ConfigError::Parse)?
        } else {
            Self::default()
        };

        config.runtime = Runtime::from_env(env, project_file)?;
        config.validate()?;

        debug!(
            project_secrets = config.secrets.len(),
            service = %config.runtime.service,
            "config loaded"
        );
        Ok(config)
    }

    /// Load configuration from the current directory.
    pub fn load(env: &Environment) -> Result<Self> {
        let dir = std::env::current_dir()?;
        Self::load_from(&dir, env)
    }

    /// Write the persisted part of the configuration back to the project file.
    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(&self.runtime.project_file, contents)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if let Some(ns) = &self.vault.namespace {
            validation::validate_namespace(ns)?;
        }
        validation::validate_namespace(&self.runtime.service).map_err(|_| {
            ConfigError::InvalidValue {
                name: vars::KEYRING_SERVICE.to_string(),
                reason: "service identifier cannot contain ':' or whitespace".to_string(),
            }
        })?;
        if self.vault.native_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                name: "vault.native_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Base directory (`~/.gnoman` unless overridden).
    pub fn home(&self) -> &Path {
        &self.runtime.home
    }

    /// Path of the project-local config file (may not exist).
    pub fn project_file(&self) -> &Path {
        &self.runtime.project_file
    }

    /// Native keychain service identifier.
    pub fn service(&self) -> &str {
        &self.runtime.service
    }

    /// Default namespace for keyring operations.
    pub fn namespace(&self) -> &str {
        self.vault
            .namespace
            .as_deref()
            .unwrap_or(&self.runtime.service)
    }

    /// Backend the Manager starts its cascade at.
    pub fn preferred_backend(&self) -> BackendKind {
        self.runtime
            .backend_override
            .or(self.vault.backend)
            .unwrap_or(BackendKind::Native)
    }

    /// Override the preferred backend (e.g. from a CLI flag).
    pub fn set_preferred_backend(&mut self, kind: BackendKind) {
        self.runtime.backend_override = Some(kind);
    }

    /// Encrypted-file store path.
    pub fn store_path(&self) -> PathBuf {
        self.runtime
            .store_override
            .clone()
            .or_else(|| self.vault.store_path.clone())
            .unwrap_or_else(|| self.runtime.home.join(constants::STORE_FILE))
    }

    /// Audit log path.
    pub fn audit_log_path(&self) -> PathBuf {
        self.runtime
            .audit_override
            .clone()
            .or_else(|| self.vault.audit_log.clone())
            .unwrap_or_else(|| self.runtime.home.join(constants::AUDIT_LOG_FILE))
    }

    /// Explicit passphrase for file-backend key derivation, if provided.
    pub fn passphrase(&self) -> Option<&str> {
        self.runtime.passphrase.as_deref()
    }

    /// Timeout for each native keychain call.
    pub fn native_timeout(&self) -> Duration {
        Duration::from_millis(
            self.vault
                .native_timeout_ms
                .unwrap_or(constants::DEFAULT_NATIVE_TIMEOUT_MS),
        )
    }
}

impl Runtime {
    fn from_env(env: &Environment, project_file: PathBuf) -> Result<Self> {
        let home = match env.non_empty(vars::HOME) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDir)?
                .join(constants::HOME_DIR),
        };

        let backend_override = env
            .non_empty(vars::BACKEND)
            .map(|name| name.parse::<BackendKind>())
            .transpose()?;

        Ok(Self {
            home,
            project_file,
            service: env
                .non_empty(vars::KEYRING_SERVICE)
                .unwrap_or_else(|| constants::DEFAULT_SERVICE.to_string()),
            // Passphrases are used verbatim; only an empty value counts as unset.
            passphrase: env.var(vars::VAULT_PASSPHRASE).filter(|p| !p.is_empty()),
            store_override: env.non_empty(vars::VAULT_PATH).map(PathBuf::from),
            audit_override: env.non_empty(vars::AUDIT_LOG).map(PathBuf::from),
            backend_override,
        })
    }
}
