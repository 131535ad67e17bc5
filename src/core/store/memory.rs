//! Volatile in-process backend.
//!
//! Nothing survives the process. This is the terminal fallback of the
//! cascade and is handy in tests.

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::{Backend, BackendKind};
use crate::core::types::{SecretId, SecretValue};
use crate::error::Result;

/// In-memory map backend.
#[derive(Debug, Default)]
pub struct Volatile {
    entries: BTreeMap<SecretId, SecretValue>,
    initialized: bool,
}

impl Volatile {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for Volatile {
    fn kind(&self) -> BackendKind {
        BackendKind::Volatile
    }

    /// The first call starts from an empty map. Later calls keep the data,
    /// so a manager switching away and back does not lose it.
    async fn initialize(&mut self) -> Result<()> {
        if !self.initialized {
            self.entries.clear();
            self.initialized = true;
        }
        Ok(())
    }

    async fn get(&mut self, id: &SecretId) -> Result<Option<SecretValue>> {
        Ok(self.entries.get(id).cloned())
    }

    async fn set(&mut self, id: &SecretId, value: &str) -> Result<()> {
        self.entries.insert(id.clone(), value.to_string());
        Ok(())
    }

    async fn delete(&mut self, id: &SecretId) -> Result<bool> {
        Ok(self.entries.remove(id).is_some())
    }

    async fn list(&mut self) -> Result<BTreeMap<SecretId, SecretValue>> {
        Ok(self.entries.clone())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.entries.clear();
        self.initialized = false;
        Ok(())
    }
}
