//! Keyring manager.
//!
//! Single point of access to stored secrets. The manager owns every backend
//! instance it has built, exactly one of which is active. It walks the
//! fallback cascade when a backend cannot initialize or fails at runtime,
//! serves reads through an in-memory cache and writes one audit record per
//! operation.
//!
//! ```text
//! Uninitialized --switch_backend(X)--> Active(X | first live successor of X)
//! Active(B) --switch_backend(C) ok--> Active(C)
//! Active(B) --switch_backend(C) all fail--> Active(B), NoAvailableBackend
//! Active(B) --op fails Unavailable--> Active(successor), op retried once
//! ```
//!
//! All state lives behind one async mutex, so a switch can never interleave
//! with a read or write.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::core::audit::{AuditLog, AuditOperation, AuditOutcome, AuditRecord};
use crate::core::store::{Backend, BackendFactory, BackendKind};
use crate::core::types::{SecretId, SecretValue};
use crate::core::validation;
use crate::error::{Error, Result, StoreError};

/// Values shorter than this never show a prefix.
const PREVIEW_MIN_LEN: usize = 16;
const PREVIEW_PREFIX_LEN: usize = 4;
const PREVIEW_MASK: &str = "••••";

/// Masked listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretSummary {
    pub namespace: String,
    pub key: String,
    /// At most a short prefix of the value followed by a mask.
    pub preview: String,
}

impl SecretSummary {
    fn new(id: &SecretId, value: &str) -> Self {
        Self {
            namespace: id.namespace().to_string(),
            key: id.key().to_string(),
            preview: preview(value),
        }
    }
}

/// Mask a value for display.
pub fn preview(value: &str) -> String {
    if value.chars().count() < PREVIEW_MIN_LEN {
        return PREVIEW_MASK.to_string();
    }
    let prefix: String = value.chars().take(PREVIEW_PREFIX_LEN).collect();
    format!("{}{}", prefix, PREVIEW_MASK)
}

enum Op<'a> {
    Get(&'a SecretId),
    Set(&'a SecretId, &'a str),
    Delete(&'a SecretId),
    List,
}

enum Outcome {
    Value(Option<SecretValue>),
    Stored,
    Removed(bool),
    Entries(BTreeMap<SecretId, SecretValue>),
}

impl Op<'_> {
    fn name(&self) -> &'static str {
        match self {
            Op::Get(_) => "get",
            Op::Set(..) => "set",
            Op::Delete(_) => "delete",
            Op::List => "list",
        }
    }

    async fn apply(&self, backend: &mut dyn Backend) -> Result<Outcome> {
        match self {
            Op::Get(id) => backend.get(id).await.map(Outcome::Value),
            Op::Set(id, value) => backend.set(id, value).await.map(|()| Outcome::Stored),
            Op::Delete(id) => backend.delete(id).await.map(Outcome::Removed),
            Op::List => backend.list().await.map(Outcome::Entries),
        }
    }
}

/// Reason string of an unavailability error.
fn unavailable_reason(err: &Error) -> String {
    match err {
        Error::Store(StoreError::Unavailable { reason, .. }) => reason.clone(),
        other => other.to_string(),
    }
}

struct State {
    factory: Box<dyn BackendFactory>,
    backends: HashMap<BackendKind, Box<dyn Backend>>,
    active: Option<BackendKind>,
    cache: BTreeMap<SecretId, SecretValue>,
    namespace: String,
    audit: AuditLog,
}

impl State {
    /// Walk the cascade from `start` until a backend initializes and loads.
    ///
    /// Instances are reused across switches and never torn down here. On
    /// exhaustion the active backend is left as it was.
    async fn activate(
        &mut self,
        start: BackendKind,
        attempts: &mut Vec<(BackendKind, String)>,
    ) -> Result<BackendKind> {
        for &kind in start.cascade_from() {
            let mut backend = match self.backends.remove(&kind) {
                Some(parked) => parked,
                None => self.factory.create(kind),
            };

            let loaded = match backend.initialize().await {
                Ok(()) => backend.list().await,
                Err(e) => Err(e),
            };
            self.backends.insert(kind, backend);

            match loaded {
                Ok(entries) => {
                    if self.active != Some(kind) {
                        info!(
                            backend = %kind,
                            previous = ?self.active.map(BackendKind::name),
                            "keyring backend active"
                        );
                    }
                    self.active = Some(kind);
                    self.cache = entries;
                    debug!(backend = %kind, cached = self.cache.len(), "cache loaded");
                    return Ok(kind);
                }
                Err(e) if e.is_unavailable() => {
                    warn!(
                        backend = %kind,
                        error = %e,
                        "backend unavailable, trying next in cascade"
                    );
                    attempts.push((kind, unavailable_reason(&e)));
                }
                Err(e) => return Err(e),
            }
        }

        Err(StoreError::NoAvailableBackend {
            attempts: std::mem::take(attempts),
        }
        .into())
    }

    /// Run `op` on the active backend, falling forward through the cascade
    /// while it reports unavailability.
    async fn run(&mut self, op: Op<'_>) -> Result<Outcome> {
        let mut current = self.active.ok_or(StoreError::NotInitialized)?;
        let mut attempts = Vec::new();

        loop {
            let backend = self
                .backends
                .get_mut(&current)
                .ok_or(StoreError::NotInitialized)?;

            match op.apply(backend.as_mut()).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_unavailable() => {
                    warn!(
                        backend = %current,
                        op = op.name(),
                        error = %e,
                        "backend failed at runtime, falling back"
                    );
                    attempts.push((current, unavailable_reason(&e)));
                    let Some(next) = current.successor() else {
                        return Err(StoreError::NoAvailableBackend { attempts }.into());
                    };
                    current = self.activate(next, &mut attempts).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn secret_id(&self, key: &str, namespace: Option<&str>) -> Result<SecretId> {
        validation::secret_id(namespace.unwrap_or(&self.namespace), key)
    }

    async fn audit(&mut self, operation: AuditOperation, subject: Option<&str>, success: bool) {
        let backend = self.active;
        self.audit
            .record(backend, operation, subject, AuditOutcome::from_success(success))
            .await;
    }
}

/// Orchestrates backends, the cache and the audit trail.
pub struct KeyringManager {
    state: Mutex<State>,
}

impl KeyringManager {
    /// Manager in the uninitialized state. Call
    /// [`switch_backend`](Self::switch_backend) before any other operation.
    pub fn new(
        factory: impl BackendFactory + 'static,
        namespace: impl Into<String>,
        audit: AuditLog,
    ) -> Result<Self> {
        let namespace = namespace.into();
        validation::validate_namespace(&namespace)?;

        Ok(Self {
            state: Mutex::new(State {
                factory: Box::new(factory),
                backends: HashMap::new(),
                active: None,
                cache: BTreeMap::new(),
                namespace,
                audit,
            }),
        })
    }

    /// Activate `kind`, or the first backend after it in the cascade that
    /// initializes. Returns the backend that became active.
    ///
    /// # Errors
    ///
    /// `StoreError::NoAvailableBackend` if every candidate is unavailable;
    /// the previously active backend (if any) stays active.
    pub async fn switch_backend(&self, kind: BackendKind) -> Result<BackendKind> {
        let mut state = self.state.lock().await;
        let mut attempts = Vec::new();
        let result = state.activate(kind, &mut attempts).await;

        if let Ok(active) = &result {
            if *active != kind {
                warn!(
                    requested = %kind,
                    active = %active,
                    "requested backend unavailable, fell back"
                );
            }
        }
        state.audit(AuditOperation::Switch, None, result.is_ok()).await;
        result
    }

    /// Change the default namespace for later operations.
    pub async fn switch_namespace(&self, namespace: &str) -> Result<()> {
        validation::validate_namespace(namespace)?;
        let mut state = self.state.lock().await;
        debug!(from = %state.namespace, to = %namespace, "switching namespace");
        state.namespace = namespace.to_string();
        Ok(())
    }

    /// Look up a secret, served from the cache when possible.
    pub async fn get(&self, key: &str, namespace: Option<&str>) -> Result<Option<SecretValue>> {
        let mut state = self.state.lock().await;
        let subject = format!("{}:{}", namespace.unwrap_or(&state.namespace), key);

        let result = match state.secret_id(key, namespace) {
            Ok(id) => Self::read_through(&mut state, &id).await,
            Err(e) => Err(e),
        };
        state.audit(AuditOperation::Get, Some(&subject), result.is_ok()).await;
        result
    }

    async fn read_through(state: &mut State, id: &SecretId) -> Result<Option<SecretValue>> {
        if state.active.is_none() {
            return Err(StoreError::NotInitialized.into());
        }
        if let Some(value) = state.cache.get(id) {
            return Ok(Some(value.clone()));
        }

        let value = match state.run(Op::Get(id)).await? {
            Outcome::Value(value) => value,
            _ => None,
        };
        if let Some(v) = &value {
            state.cache.insert(id.clone(), v.clone());
        }
        Ok(value)
    }

    /// Create or replace a secret. The backend is written before the cache.
    pub async fn set(&self, key: &str, value: &str, namespace: Option<&str>) -> Result<()> {
        let mut state = self.state.lock().await;
        let subject = format!("{}:{}", namespace.unwrap_or(&state.namespace), key);

        let result = async {
            let id = state.secret_id(key, namespace)?;
            validation::validate_value(key, value)?;
            state.run(Op::Set(&id, value)).await?;
            state.cache.insert(id, value.to_string());
            Ok::<(), Error>(())
        }
        .await;
        state.audit(AuditOperation::Set, Some(&subject), result.is_ok()).await;
        result
    }

    /// Remove a secret. Returns `true` if it existed.
    pub async fn delete(&self, key: &str, namespace: Option<&str>) -> Result<bool> {
        let mut state = self.state.lock().await;
        let subject = format!("{}:{}", namespace.unwrap_or(&state.namespace), key);

        let result = async {
            let id = state.secret_id(key, namespace)?;
            let removed = match state.run(Op::Delete(&id)).await? {
                Outcome::Removed(removed) => removed,
                _ => false,
            };
            state.cache.remove(&id);
            Ok::<bool, Error>(removed)
        }
        .await;
        state.audit(AuditOperation::Delete, Some(&subject), result.is_ok()).await;
        result
    }

    /// Masked summary of the secrets in a namespace.
    ///
    /// Always re-reads the backend and replaces the cache with the result.
    pub async fn list(&self, namespace: Option<&str>) -> Result<Vec<SecretSummary>> {
        let mut state = self.state.lock().await;
        let namespace = namespace.unwrap_or(&state.namespace).to_string();

        let result = async {
            validation::validate_namespace(&namespace)?;
            let entries = match state.run(Op::List).await? {
                Outcome::Entries(entries) => entries,
                _ => BTreeMap::new(),
            };
            state.cache = entries;
            let summaries: Vec<SecretSummary> = state
                .cache
                .iter()
                .filter(|(id, _)| id.namespace() == namespace)
                .map(|(id, value)| SecretSummary::new(id, value))
                .collect();
            Ok::<_, Error>(summaries)
        }
        .await;
        state.audit(AuditOperation::List, Some(&namespace), result.is_ok()).await;
        result
    }

    /// The active backend, `None` while uninitialized.
    pub async fn active_backend(&self) -> Option<BackendKind> {
        self.state.lock().await.active
    }

    /// Current default namespace.
    pub async fn namespace(&self) -> String {
        self.state.lock().await.namespace.clone()
    }

    /// Audit records written by this manager, oldest first.
    pub async fn recent_audit(&self) -> Vec<AuditRecord> {
        self.state.lock().await.audit.recent().cloned().collect()
    }

    /// Shut down every backend instance and return to the uninitialized state.
    pub async fn shutdown(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        for (kind, backend) in state.backends.iter_mut() {
            if let Err(e) = backend.shutdown().await {
                warn!(backend = %kind, error = %e, "backend shutdown failed");
            }
        }
        state.backends.clear();
        state.cache.clear();
        state.active = None;
        debug!("keyring manager shut down");
        Ok(())
    }
}

impl std::fmt::Debug for KeyringManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringManager").finish_non_exhaustive()
    }
}
