//! Encrypted-file backend.
//!
//! Portable at-rest store that does not depend on an OS secret manager.
//! The whole key/value map is serialized to JSON, sealed with AES-256-GCM
//! and written as one document:
//!
//! ```text
//! {"version":1,"salt":"<b64>","nonce":"<b64>","authTag":"<b64>","data":"<b64>"}
//! ```
//!
//! The 32-byte key is derived with HKDF-SHA256 from an operator passphrase
//! (`GNOMAN_VAULT_PASSPHRASE`) or, failing that, a `hostname|username`
//! fingerprint, plus a per-store random salt. The salt is generated once and
//! kept across writes; the 96-bit nonce is fresh on every write.
//!
//! A missing file is an empty store. A file that fails to parse or
//! authenticate is reported as unavailable, never as empty.
//!
//! There is no cross-process locking: two processes writing the same path
//! can lose each other's updates.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Key, KeyInit, Nonce};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use super::{Backend, BackendKind};
use crate::core::types::{SecretId, SecretValue};
use crate::error::{Result, StoreError};

/// Persisted document format version.
pub const STORE_VERSION: u32 = 1;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// HKDF info label.
const KDF_INFO: &[u8] = b"gnoman-keyring-v1";

/// Associated data binding ciphertext to the format version.
const AAD: &[u8] = b"gnoman-keyring:v1";

/// On-disk document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedStore {
    pub version: u32,
    pub salt: String,
    pub nonce: String,
    pub auth_tag: String,
    pub data: String,
}

/// Password-equivalent input for key derivation.
pub enum KeyMaterial {
    /// Explicit operator passphrase.
    Passphrase(Zeroizing<String>),
    /// `hostname|username` fingerprint of the local machine.
    Fingerprint(String),
}

impl KeyMaterial {
    pub fn passphrase(passphrase: impl Into<String>) -> Self {
        Self::Passphrase(Zeroizing::new(passphrase.into()))
    }

    /// Fingerprint of the current host and user.
    pub fn host_fingerprint() -> Self {
        let host = gethostname::gethostname().to_string_lossy().into_owned();
        Self::Fingerprint(format!("{}|{}", host, whoami::username()))
    }

    /// The passphrase if one is given, otherwise the host fingerprint.
    pub fn from_passphrase_or_host(passphrase: Option<&str>) -> Self {
        match passphrase {
            Some(p) => Self::passphrase(p),
            None => Self::host_fingerprint(),
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Passphrase(p) => p.as_bytes(),
            Self::Fingerprint(f) => f.as_bytes(),
        }
    }

    fn derive_key(&self, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        let hkdf = Hkdf::<Sha256>::new(Some(salt), self.as_bytes());
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        hkdf.expand(KDF_INFO, &mut key[..]).map_err(|_| {
            StoreError::unavailable(BackendKind::EncryptedFile, "key derivation failed")
        })?;
        Ok(key)
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passphrase(_) => write!(f, "KeyMaterial::Passphrase([REDACTED])"),
            Self::Fingerprint(_) => write!(f, "KeyMaterial::Fingerprint([REDACTED])"),
        }
    }
}

fn unavailable(reason: impl Into<String>) -> StoreError {
    StoreError::unavailable(BackendKind::EncryptedFile, reason)
}

fn decode(field: &str, value: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(value)
        .map_err(|_| unavailable(format!("store is malformed: {} is not base64", field)).into())
}

/// Seal a flat storage-key map into a document.
///
/// A fresh random nonce is drawn on every call.
pub fn seal_store(
    key: &[u8; KEY_LEN],
    salt: &[u8],
    entries: &BTreeMap<String, SecretValue>,
) -> Result<PersistedStore> {
    let plaintext = Zeroizing::new(serde_json::to_vec(entries)?);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let mut sealed = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext.as_slice(),
                aad: AAD,
            },
        )
        .map_err(|_| unavailable("encryption failed"))?;
    let tag = sealed.split_off(sealed.len() - TAG_LEN);

    Ok(PersistedStore {
        version: STORE_VERSION,
        salt: BASE64.encode(salt),
        nonce: BASE64.encode(nonce),
        auth_tag: BASE64.encode(tag),
        data: BASE64.encode(sealed),
    })
}

/// Authenticate and decrypt a document.
pub fn open_store(
    key: &[u8; KEY_LEN],
    doc: &PersistedStore,
) -> Result<BTreeMap<String, SecretValue>> {
    let nonce = decode("nonce", &doc.nonce)?;
    let tag = decode("authTag", &doc.auth_tag)?;
    let mut sealed = decode("data", &doc.data)?;
    if nonce.len() != NONCE_LEN || tag.len() != TAG_LEN {
        return Err(unavailable("store is malformed: bad nonce or tag length").into());
    }
    sealed.extend_from_slice(&tag);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &sealed,
                    aad: AAD,
                },
            )
            .map_err(|_| unavailable("store failed authentication (wrong key or tampered file)"))?,
    );

    serde_json::from_slice(&plaintext)
        .map_err(|_| unavailable("store is malformed: decrypted payload is not a map").into())
}

struct Loaded {
    salt: [u8; SALT_LEN],
    key: Zeroizing<[u8; KEY_LEN]>,
    entries: BTreeMap<String, SecretValue>,
}

impl Drop for Loaded {
    fn drop(&mut self) {
        for value in self.entries.values_mut() {
            value.zeroize();
        }
    }
}

/// AES-256-GCM encrypted JSON file backend.
pub struct EncryptedFile {
    path: PathBuf,
    material: KeyMaterial,
    state: Option<Loaded>,
}

impl EncryptedFile {
    pub fn new(path: impl Into<PathBuf>, material: KeyMaterial) -> Self {
        Self {
            path: path.into(),
            material,
            state: None,
        }
    }

    /// Store location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn loaded(&self) -> Result<&Loaded> {
        self.state
            .as_ref()
            .ok_or_else(|| unavailable("store not initialized").into())
    }

    fn loaded_mut(&mut self) -> Result<&mut Loaded> {
        self.state
            .as_mut()
            .ok_or_else(|| unavailable("store not initialized").into())
    }

    async fn load(&self) -> Result<Loaded> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no store yet, starting empty");
                let mut salt = [0u8; SALT_LEN];
                OsRng.fill_bytes(&mut salt);
                let key = self.material.derive_key(&salt)?;
                return Ok(Loaded {
                    salt,
                    key,
                    entries: BTreeMap::new(),
                });
            }
            Err(e) => return Err(unavailable(format!("cannot read store: {}", e)).into()),
        };

        #[cfg(unix)]
        if let Err(e) = crate::core::validation::validate_file_permissions(&self.path, 0o600) {
            warn!(error = %e, "store permissions are wider than owner-only");
        }

        let doc: PersistedStore = serde_json::from_slice(&bytes)
            .map_err(|_| unavailable("store is malformed: not a store document"))?;
        if doc.version != STORE_VERSION {
            return Err(unavailable(format!("unsupported store version {}", doc.version)).into());
        }

        let salt_bytes = decode("salt", &doc.salt)?;
        let salt: [u8; SALT_LEN] = salt_bytes
            .as_slice()
            .try_into()
            .map_err(|_| unavailable("store is malformed: bad salt length"))?;
        let key = self.material.derive_key(&salt)?;
        let entries = open_store(&key, &doc)?;

        debug!(entries = entries.len(), "store decrypted");
        Ok(Loaded { salt, key, entries })
    }

    /// Re-encrypt the whole map and atomically replace the file.
    async fn persist(&self) -> Result<()> {
        let loaded = self.loaded()?;
        let doc = seal_store(&loaded.key, &loaded.salt, &loaded.entries)?;
        let bytes = serde_json::to_vec_pretty(&doc)?;

        self.write_atomic(&bytes)
            .await
            .map_err(|e| unavailable(format!("cannot write store: {}", e)))?;
        debug!(path = %self.path.display(), "store written");
        Ok(())
    }

    async fn write_atomic(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let mut builder = tokio::fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            builder.mode(0o700);
            builder.create(parent).await?;
        }

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "keyring.json".to_string());
        let tmp = self.path.with_file_name(format!("{}.tmp", file_name));

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&tmp).await?;

        // mode() only applies on creation; a leftover temp file keeps its bits.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }

        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await
    }
}

impl fmt::Debug for EncryptedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedFile")
            .field("path", &self.path)
            .field("material", &self.material)
            .field("loaded", &self.state.is_some())
            .finish()
    }
}

#[async_trait]
impl Backend for EncryptedFile {
    fn kind(&self) -> BackendKind {
        BackendKind::EncryptedFile
    }

    async fn initialize(&mut self) -> Result<()> {
        let loaded = self.load().await?;
        self.state = Some(loaded);
        Ok(())
    }

    async fn get(&mut self, id: &SecretId) -> Result<Option<SecretValue>> {
        Ok(self.loaded()?.entries.get(&id.storage_key()).cloned())
    }

    async fn set(&mut self, id: &SecretId, value: &str) -> Result<()> {
        let storage_key = id.storage_key();
        let previous = self
            .loaded_mut()?
            .entries
            .insert(storage_key.clone(), value.to_string());

        if let Err(e) = self.persist().await {
            let entries = &mut self.loaded_mut()?.entries;
            match previous {
                Some(old) => entries.insert(storage_key, old),
                None => entries.remove(&storage_key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn delete(&mut self, id: &SecretId) -> Result<bool> {
        let storage_key = id.storage_key();
        let Some(previous) = self.loaded_mut()?.entries.remove(&storage_key) else {
            return Ok(false);
        };

        if let Err(e) = self.persist().await {
            self.loaded_mut()?.entries.insert(storage_key, previous);
            return Err(e);
        }
        Ok(true)
    }

    async fn list(&mut self) -> Result<BTreeMap<SecretId, SecretValue>> {
        let loaded = self.loaded()?;
        let mut out = BTreeMap::new();
        for (raw, value) in &loaded.entries {
            match SecretId::from_storage_key(raw) {
                Some(id) => {
                    out.insert(id, value.clone());
                }
                None => warn!("skipping store entry with malformed storage key"),
            }
        }
        Ok(out)
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.state = None;
        Ok(())
    }
}
