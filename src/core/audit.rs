//! Append-only audit trail of keyring operations.
//!
//! Every manager operation appends one line:
//!
//! ```text
//! 2026-01-01T12:00:00.000Z<TAB>encrypted-file<TAB>set<TAB>k_3f9a0c1d22be<TAB>ok
//! ```
//!
//! Key names are replaced by a keyed HMAC-SHA256 token. The mask key is 32
//! random bytes kept next to the log (`audit.key`, owner-only), so a reader
//! of the log alone cannot confirm a guessed key name. Values are never
//! passed to this module.
//!
//! Writing is best-effort: failures are logged with `warn!` and swallowed.

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use chrono::{DateTime, SecondsFormat, Utc};
use hkdf::hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::core::constants;
use crate::core::store::BackendKind;
use crate::error::Result;

type HmacSha256 = Hmac<Sha256>;

const MASK_KEY_LEN: usize = 32;
const MASK_HEX_LEN: usize = 12;
const MASK_PREFIX: &str = "k_";
const RECENT_CAPACITY: usize = 256;

/// Placeholder for absent fields.
const NONE_FIELD: &str = "-";

/// Audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOperation {
    Get,
    Set,
    Delete,
    List,
    Switch,
}

impl AuditOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditOperation::Get => "get",
            AuditOperation::Set => "set",
            AuditOperation::Delete => "delete",
            AuditOperation::List => "list",
            AuditOperation::Switch => "switch",
        }
    }
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditOperation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "get" => Ok(AuditOperation::Get),
            "set" => Ok(AuditOperation::Set),
            "delete" => Ok(AuditOperation::Delete),
            "list" => Ok(AuditOperation::List),
            "switch" => Ok(AuditOperation::Switch),
            other => Err(format!("unknown audit operation '{}'", other)),
        }
    }
}

/// Whether the audited operation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Ok,
    Failed,
}

impl AuditOutcome {
    pub fn from_success(success: bool) -> Self {
        if success {
            AuditOutcome::Ok
        } else {
            AuditOutcome::Failed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuditOutcome::Ok => "ok",
            AuditOutcome::Failed => "failed",
        }
    }
}

/// One audit line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    /// Backend the operation ran against; `None` before one is active.
    pub backend: Option<BackendKind>,
    pub operation: AuditOperation,
    /// Masked token of the key (or namespace, for `list`).
    pub masked: Option<String>,
    pub outcome: AuditOutcome,
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.backend.map(BackendKind::name).unwrap_or(NONE_FIELD),
            self.operation,
            self.masked.as_deref().unwrap_or(NONE_FIELD),
            self.outcome.as_str(),
        )
    }
}

impl FromStr for AuditRecord {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split('\t').collect();
        let [timestamp, backend, operation, masked, outcome] = fields.as_slice() else {
            return Err(format!("expected 5 fields, found {}", fields.len()));
        };

        let timestamp = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|e| format!("bad timestamp: {}", e))?
            .with_timezone(&Utc);
        let backend = match *backend {
            NONE_FIELD => None,
            name => Some(name.parse::<BackendKind>().map_err(|e| e.to_string())?),
        };
        let masked = match *masked {
            NONE_FIELD => None,
            token => Some(token.to_string()),
        };
        let outcome = match *outcome {
            "ok" => AuditOutcome::Ok,
            "failed" => AuditOutcome::Failed,
            other => return Err(format!("unknown outcome '{}'", other)),
        };

        Ok(Self {
            timestamp,
            backend,
            operation: operation.parse()?,
            masked,
            outcome,
        })
    }
}

/// Keyed one-way mask for key names.
#[derive(Clone)]
pub struct AuditMask {
    mac: HmacSha256,
}

impl AuditMask {
    pub fn new(key: &[u8]) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(key).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid audit mask key")
        })?;
        Ok(Self { mac })
    }

    /// Mask with a key that lives only as long as the process.
    pub fn ephemeral() -> Result<Self> {
        let mut key = Zeroizing::new([0u8; MASK_KEY_LEN]);
        OsRng.fill_bytes(&mut key[..]);
        Self::new(&key[..])
    }

    /// `k_` followed by the first 12 hex digits of HMAC-SHA256(subject).
    pub fn mask(&self, subject: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(subject.as_bytes());
        let digest = mac.finalize().into_bytes();

        let mut token = String::with_capacity(MASK_PREFIX.len() + MASK_HEX_LEN);
        token.push_str(MASK_PREFIX);
        for byte in digest.iter().take(MASK_HEX_LEN / 2) {
            token.push_str(&format!("{:02x}", byte));
        }
        token
    }
}

impl fmt::Debug for AuditMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuditMask(<redacted>)")
    }
}

/// Audit log writer.
#[derive(Debug)]
pub struct AuditLog {
    path: Option<PathBuf>,
    mask: AuditMask,
    recent: VecDeque<AuditRecord>,
}

impl AuditLog {
    /// Log appending to `path`, keyed by `audit.key` in the same directory.
    ///
    /// If the mask key cannot be read or created the log falls back to an
    /// ephemeral key: tokens stop correlating across runs but never leak.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let key_path = path
            .parent()
            .map(|dir| dir.join(constants::AUDIT_KEY_FILE))
            .unwrap_or_else(|| PathBuf::from(constants::AUDIT_KEY_FILE));

        let mask = match load_or_create_mask_key(&key_path).await {
            Ok(key) => AuditMask::new(&key[..])?,
            Err(e) => {
                warn!(
                    path = %key_path.display(),
                    error = %e,
                    "audit mask key unavailable; using ephemeral key"
                );
                AuditMask::ephemeral()?
            }
        };

        Ok(Self {
            path: Some(path),
            mask,
            recent: VecDeque::new(),
        })
    }

    /// Log that keeps records only in memory.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            path: None,
            mask: AuditMask::ephemeral()?,
            recent: VecDeque::new(),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Mask a subject with this log's key.
    pub fn mask(&self, subject: &str) -> String {
        self.mask.mask(subject)
    }

    /// Append a record. Never fails.
    pub async fn record(
        &mut self,
        backend: Option<BackendKind>,
        operation: AuditOperation,
        subject: Option<&str>,
        outcome: AuditOutcome,
    ) {
        let record = AuditRecord {
            timestamp: Utc::now(),
            backend,
            operation,
            masked: subject.map(|s| self.mask.mask(s)),
            outcome,
        };

        debug!(
            op = %record.operation,
            backend = record.backend.map(BackendKind::name).unwrap_or(NONE_FIELD),
            masked = record.masked.as_deref().unwrap_or(NONE_FIELD),
            outcome = record.outcome.as_str(),
            "audit"
        );

        if let Some(path) = &self.path {
            if let Err(e) = append_line(path, &record.to_string()).await {
                warn!(path = %path.display(), error = %e, "failed to write audit record");
            }
        }

        if self.recent.len() == RECENT_CAPACITY {
            self.recent.pop_front();
        }
        self.recent.push_back(record);
    }

    /// Records written by this process, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &AuditRecord> {
        self.recent.iter()
    }

    /// The last `n` well-formed records of an audit log file.
    ///
    /// A missing file yields no records. Malformed lines are skipped.
    pub async fn read_tail(path: &Path, n: usize) -> Result<Vec<AuditRecord>> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let records: Vec<AuditRecord> = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match line.parse::<AuditRecord>() {
                Ok(record) => Some(record),
                Err(reason) => {
                    debug!(%reason, "skipping malformed audit line");
                    None
                }
            })
            .collect();

        let skip = records.len().saturating_sub(n);
        Ok(records.into_iter().skip(skip).collect())
    }
}

async fn load_or_create_mask_key(path: &Path) -> std::io::Result<Zeroizing<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.len() == MASK_KEY_LEN => return Ok(Zeroizing::new(bytes)),
        Ok(bytes) => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("expected {} bytes, found {}", MASK_KEY_LEN, bytes.len()),
            ))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    if let Some(dir) = path.parent() {
        create_private_dir(dir).await?;
    }

    let mut key = Zeroizing::new(vec![0u8; MASK_KEY_LEN]);
    OsRng.fill_bytes(&mut key[..]);

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(&key).await?;
    file.sync_all().await?;
    debug!(path = %path.display(), "created audit mask key");
    Ok(key)
}

async fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        create_private_dir(dir).await?;
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(format!("{}\n", line).as_bytes()).await?;
    file.flush().await
}

async fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o700);
    builder.create(dir).await
}
