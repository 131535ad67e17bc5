//! Core identifiers and type aliases.
//!
//! A secret is addressed by `(namespace, key)`. Backends store it under a
//! single flat storage key, `namespace:key`.

use std::fmt;

/// Separator between namespace and key in storage keys.
pub const NAMESPACE_SEPARATOR: char = ':';

/// A caller-defined secret key (e.g. `RPC_URL`, `ETHERSCAN_API_KEY`).
pub type SecretKey = String;

/// A logical grouping of secrets, usually one per external service.
pub type Namespace = String;

/// A plaintext secret value.
pub type SecretValue = String;

/// Unique address of a secret inside one backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SecretId {
    namespace: Namespace,
    key: SecretKey,
}

impl SecretId {
    /// Build an id without validation. Use [`crate::core::validation`] on
    /// caller input first.
    pub fn new(namespace: impl Into<Namespace>, key: impl Into<SecretKey>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Flat storage key used by every backend.
    pub fn storage_key(&self) -> String {
        format!("{}{}{}", self.namespace, NAMESPACE_SEPARATOR, self.key)
    }

    /// Parse a storage key back into an id.
    ///
    /// Namespaces never contain the separator, so the first one splits.
    pub fn from_storage_key(raw: &str) -> Option<Self> {
        let (namespace, key) = raw.split_once(NAMESPACE_SEPARATOR)?;
        if namespace.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self::new(namespace, key))
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}
