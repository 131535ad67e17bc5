//! Secret resolution cascade.
//!
//! Answers "what is the effective value of secret K" by checking, in order:
//!
//! 1. the process environment
//! 2. the `[secrets]` table of the project `.gnoman.toml`
//! 3. the encrypted-file store
//! 4. the native keychain, only inside an interactive desktop session
//!
//! The first non-empty trimmed value wins. The cascade owns its own backend
//! instances and never goes through the keyring manager, so the manager's
//! active backend has no influence on resolution.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::config::Config;
use crate::core::env::Environment;
use crate::core::session;
use crate::core::store::{Backend, StandardBackends};
use crate::core::types::SecretId;
use crate::core::validation;
use crate::error::{Result, SecretError};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecretSource {
    Env,
    ProjectFile,
    EncryptedFile,
    NativeKeyring,
    Missing,
}

impl SecretSource {
    pub fn name(self) -> &'static str {
        match self {
            SecretSource::Env => "env",
            SecretSource::ProjectFile => "project-file",
            SecretSource::EncryptedFile => "encrypted-file",
            SecretSource::NativeKeyring => "native-keyring",
            SecretSource::Missing => "missing",
        }
    }
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolution policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// The caller needs a value.
    pub required: bool,
    /// A missing required value is an error. Ignored unless `required`.
    pub fail_closed: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            required: false,
            fail_closed: true,
        }
    }
}

impl ResolveOptions {
    /// Required and fail-closed.
    pub fn required() -> Self {
        Self {
            required: true,
            fail_closed: true,
        }
    }
}

/// Result of a resolution, with provenance.
#[derive(Clone, Serialize)]
pub struct SecretResolution {
    pub key: String,
    #[serde(skip)]
    value: Option<String>,
    pub source: SecretSource,
    /// Every source consulted, in order, including the hit.
    pub checked: Vec<SecretSource>,
}

impl SecretResolution {
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn into_value(self) -> Option<String> {
        self.value
    }

    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}

impl fmt::Debug for SecretResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretResolution")
            .field("key", &self.key)
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .field("source", &self.source)
            .field("checked", &self.checked)
            .finish()
    }
}

/// Trimmed value if present and non-empty.
fn usable(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The resolution cascade.
pub struct SecretResolver {
    env: Environment,
    project: BTreeMap<String, String>,
    namespace: String,
    encrypted_file: Box<dyn Backend>,
    native: Box<dyn Backend>,
    interactive: bool,
}

impl SecretResolver {
    pub fn new(
        env: Environment,
        project: BTreeMap<String, String>,
        namespace: impl Into<String>,
        encrypted_file: Box<dyn Backend>,
        native: Box<dyn Backend>,
    ) -> Self {
        let interactive = session::is_interactive(&env);
        Self {
            env,
            project,
            namespace: namespace.into(),
            encrypted_file,
            native,
            interactive,
        }
    }

    /// Cascade over the configured environment, project file and stores.
    pub fn from_config(config: &Config, env: &Environment, backends: &StandardBackends) -> Self {
        Self::new(
            env.clone(),
            config.secrets.clone(),
            config.namespace(),
            Box::new(backends.encrypted_file()),
            Box::new(backends.native()),
        )
    }

    /// Probe the stores under `namespace` instead of the configured one.
    ///
    /// # Errors
    ///
    /// `ValidationError::InvalidNamespace` for an unusable namespace.
    pub fn with_namespace(mut self, namespace: &str) -> Result<Self> {
        validation::validate_namespace(namespace)?;
        self.namespace = namespace.to_string();
        Ok(self)
    }

    /// Override interactive-session detection.
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Resolve `key`.
    ///
    /// # Errors
    ///
    /// `SecretError::MissingRequired` when no source has a value and the
    /// options are required and fail-closed. Unavailable stores count as
    /// misses; other store failures propagate.
    pub async fn resolve(
        &mut self,
        key: &str,
        options: ResolveOptions,
    ) -> Result<SecretResolution> {
        validation::validate_key(key)?;
        let id = SecretId::new(self.namespace.clone(), key);
        let mut checked = Vec::with_capacity(4);

        checked.push(SecretSource::Env);
        if let Some(value) = usable(self.env.var(key).as_deref()) {
            return Ok(self.found(key, value, SecretSource::Env, checked));
        }

        checked.push(SecretSource::ProjectFile);
        if let Some(value) = usable(self.project.get(key).map(String::as_str)) {
            return Ok(self.found(key, value, SecretSource::ProjectFile, checked));
        }

        checked.push(SecretSource::EncryptedFile);
        if let Some(value) = Self::probe(self.encrypted_file.as_mut(), &id).await? {
            return Ok(self.found(key, value, SecretSource::EncryptedFile, checked));
        }

        if self.interactive {
            checked.push(SecretSource::NativeKeyring);
            if let Some(value) = Self::probe(self.native.as_mut(), &id).await? {
                return Ok(self.found(key, value, SecretSource::NativeKeyring, checked));
            }
        } else {
            debug!("no interactive session; skipping native keychain");
        }

        if options.required && options.fail_closed {
            return Err(SecretError::MissingRequired {
                key: key.to_string(),
                checked,
            }
            .into());
        }

        debug!(
            checked = checked.len(),
            required = options.required,
            "secret not resolved"
        );
        Ok(SecretResolution {
            key: key.to_string(),
            value: None,
            source: SecretSource::Missing,
            checked,
        })
    }

    /// Look `id` up in a store, re-initializing it first so a changed file
    /// is seen. Unavailability is a miss.
    async fn probe(backend: &mut dyn Backend, id: &SecretId) -> Result<Option<String>> {
        let lookup = match backend.initialize().await {
            Ok(()) => backend.get(id).await,
            Err(e) => Err(e),
        };

        match lookup {
            Ok(value) => Ok(usable(value.as_deref())),
            Err(e) if e.is_unavailable() => {
                warn!(backend = %backend.kind(), error = %e, "skipping unavailable source");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn found(
        &self,
        key: &str,
        value: String,
        source: SecretSource,
        checked: Vec<SecretSource>,
    ) -> SecretResolution {
        debug!(%source, "secret resolved");
        SecretResolution {
            key: key.to_string(),
            value: Some(value),
            source,
            checked,
        }
    }
}

impl fmt::Debug for SecretResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretResolver")
            .field("namespace", &self.namespace)
            .field("project_secrets", &self.project.len())
            .field("interactive", &self.interactive)
            .finish_non_exhaustive()
    }
}
