//! Native OS credential manager backend.
//!
//! Delegates to the platform secret store (macOS Keychain, Windows
//! Credential Manager, Secret Service on Linux) through the `keyring` crate,
//! under one fixed service identifier. Each secret is one entry whose
//! account is the storage key `namespace:key`.
//!
//! The OS APIs cannot enumerate entries, so the backend keeps a JSON index
//! of storage keys in a reserved entry. Every call runs on the blocking pool
//! with a timeout; a degraded keychain daemon can otherwise hang forever.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{Backend, BackendKind};
use crate::core::types::{SecretId, SecretValue};
use crate::error::{Result, StoreError};

/// Account holding the index of stored keys.
const INDEX_ACCOUNT: &str = "__gnoman_index__";

/// Raw credential store operations.
///
/// Errors are platform failure descriptions; the backend reports all of
/// them as unavailability.
pub trait Credentials: Send + Sync + 'static {
    /// Read a password, `Ok(None)` if the entry does not exist.
    fn get(&self, service: &str, account: &str) -> std::result::Result<Option<String>, String>;

    /// Create or replace a password.
    fn set(&self, service: &str, account: &str, secret: &str) -> std::result::Result<(), String>;

    /// Delete a password. `Ok(false)` if the entry did not exist.
    fn delete(&self, service: &str, account: &str) -> std::result::Result<bool, String>;
}

/// The operating system credential manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsCredentials;

impl Credentials for OsCredentials {
    fn get(&self, service: &str, account: &str) -> std::result::Result<Option<String>, String> {
        let entry = keyring::Entry::new(service, account).map_err(|e| e.to_string())?;
        match entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.to_string()),
        }
    }

    fn set(&self, service: &str, account: &str, secret: &str) -> std::result::Result<(), String> {
        let entry = keyring::Entry::new(service, account).map_err(|e| e.to_string())?;
        entry.set_password(secret).map_err(|e| e.to_string())
    }

    fn delete(&self, service: &str, account: &str) -> std::result::Result<bool, String> {
        let entry = keyring::Entry::new(service, account).map_err(|e| e.to_string())?;
        match entry.delete_password() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Native keychain backend.
pub struct NativeKeyring {
    service: String,
    timeout: Duration,
    credentials: Arc<dyn Credentials>,
    index: Option<BTreeSet<String>>,
}

impl NativeKeyring {
    /// Backend over the OS credential manager.
    pub fn new(service: impl Into<String>, timeout: Duration) -> Self {
        Self::with_credentials(service, timeout, Arc::new(OsCredentials))
    }

    /// Backend over any credential store.
    pub fn with_credentials(
        service: impl Into<String>,
        timeout: Duration,
        credentials: Arc<dyn Credentials>,
    ) -> Self {
        Self {
            service: service.into(),
            timeout,
            credentials,
            index: None,
        }
    }

    /// Service identifier all entries live under.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Run one credential call on the blocking pool, bounded by the timeout.
    async fn call<T, F>(&self, op: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn Credentials) -> std::result::Result<T, String> + Send + 'static,
    {
        let credentials = Arc::clone(&self.credentials);
        let task = tokio::task::spawn_blocking(move || f(credentials.as_ref()));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(reason))) => {
                debug!(op, error = %reason, "native keychain call failed");
                Err(StoreError::unavailable(BackendKind::Native, reason).into())
            }
            Ok(Err(join)) => Err(StoreError::unavailable(
                BackendKind::Native,
                format!("keychain task failed: {}", join),
            )
            .into()),
            Err(_) => {
                warn!(
                    op,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "native keychain call timed out"
                );
                Err(StoreError::unavailable(
                    BackendKind::Native,
                    format!("{} timed out after {}ms", op, self.timeout.as_millis()),
                )
                .into())
            }
        }
    }

    async fn read(&self, account: String) -> Result<Option<String>> {
        let service = self.service.clone();
        self.call("get", move |c| c.get(&service, &account)).await
    }

    async fn write(&self, account: String, secret: String) -> Result<()> {
        let service = self.service.clone();
        self.call("set", move |c| c.set(&service, &account, &secret))
            .await
    }

    async fn remove(&self, account: String) -> Result<bool> {
        let service = self.service.clone();
        self.call("delete", move |c| c.delete(&service, &account))
            .await
    }

    async fn load_index(&self) -> Result<BTreeSet<String>> {
        match self.read(INDEX_ACCOUNT.to_string()).await? {
            None => Ok(BTreeSet::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|_| {
                StoreError::unavailable(BackendKind::Native, "keychain index entry is malformed")
                    .into()
            }),
        }
    }

    async fn save_index(&self, index: &BTreeSet<String>) -> Result<()> {
        let raw = serde_json::to_string(index)?;
        self.write(INDEX_ACCOUNT.to_string(), raw).await
    }

    fn index(&self) -> Result<&BTreeSet<String>> {
        self.index.as_ref().ok_or_else(|| {
            StoreError::unavailable(BackendKind::Native, "keychain not initialized").into()
        })
    }

    fn index_mut(&mut self) -> Result<&mut BTreeSet<String>> {
        self.index.as_mut().ok_or_else(|| {
            StoreError::unavailable(BackendKind::Native, "keychain not initialized").into()
        })
    }
}

impl std::fmt::Debug for NativeKeyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeKeyring")
            .field("service", &self.service)
            .field("timeout", &self.timeout)
            .field("indexed", &self.index.as_ref().map(BTreeSet::len))
            .finish()
    }
}

#[async_trait]
impl Backend for NativeKeyring {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    /// Probe the keychain by reading the index entry, so a missing daemon is
    /// detected here rather than on the first `get`.
    async fn initialize(&mut self) -> Result<()> {
        let index = self.load_index().await?;
        info!(service = %self.service, entries = index.len(), "native keychain available");
        self.index = Some(index);
        Ok(())
    }

    async fn get(&mut self, id: &SecretId) -> Result<Option<SecretValue>> {
        self.index()?;
        self.read(id.storage_key()).await
    }

    async fn set(&mut self, id: &SecretId, value: &str) -> Result<()> {
        let account = id.storage_key();
        self.write(account.clone(), value.to_string()).await?;

        if !self.index()?.contains(&account) {
            let mut next = self.index()?.clone();
            next.insert(account);
            self.save_index(&next).await?;
            *self.index_mut()? = next;
        }
        Ok(())
    }

    async fn delete(&mut self, id: &SecretId) -> Result<bool> {
        let account = id.storage_key();
        let removed = self.remove(account.clone()).await?;

        if self.index()?.contains(&account) {
            let mut next = self.index()?.clone();
            next.remove(&account);
            self.save_index(&next).await?;
            *self.index_mut()? = next;
        }
        Ok(removed)
    }

    async fn list(&mut self) -> Result<BTreeMap<SecretId, SecretValue>> {
        let accounts = self.index()?.clone();
        let mut out = BTreeMap::new();
        let mut dangling = Vec::new();

        for account in accounts {
            match self.read(account.clone()).await? {
                Some(value) => match SecretId::from_storage_key(&account) {
                    Some(id) => {
                        out.insert(id, value);
                    }
                    None => dangling.push(account),
                },
                None => dangling.push(account),
            }
        }

        if !dangling.is_empty() {
            debug!(count = dangling.len(), "pruning dangling keychain index entries");
            let mut next = self.index()?.clone();
            for account in &dangling {
                next.remove(account);
            }
            self.save_index(&next).await?;
            *self.index_mut()? = next;
        }

        Ok(out)
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.index = None;
        Ok(())
    }
}
