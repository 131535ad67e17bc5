//! Application settings stored in the vault.
//!
//! Settings documents are serialized to JSON and kept as ordinary secrets in
//! the `settings` namespace, so they follow the active backend, the cache and
//! the audit trail like any other entry.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants;
use crate::core::keyring::KeyringManager;
use crate::error::{Result, SettingsError};

/// Document name of [`AppSettings`].
const APP_DOCUMENT: &str = "app";

pub const DEFAULT_CHAIN_ID: u64 = 1;
pub const DEFAULT_ETHERSCAN_BASE_URL: &str = "https://api.etherscan.io/api";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Settings shared by the wallet, Safe and explorer integrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// JSON-RPC endpoint.
    pub rpc_url: Option<String>,
    pub chain_id: u64,
    pub etherscan_base_url: String,
    /// Poll interval for on-chain state, in seconds.
    pub poll_interval_secs: u64,
    /// Multisig Safe address.
    pub safe_address: Option<String>,
    /// Label of the wallet used when none is given.
    pub default_wallet: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            rpc_url: None,
            chain_id: DEFAULT_CHAIN_ID,
            etherscan_base_url: DEFAULT_ETHERSCAN_BASE_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            safe_address: None,
            default_wallet: None,
        }
    }
}

impl AppSettings {
    pub const FIELDS: [&'static str; 6] = [
        "rpc_url",
        "chain_id",
        "etherscan_base_url",
        "poll_interval_secs",
        "safe_address",
        "default_wallet",
    ];

    /// Display value of one field; `None` for an unset optional field.
    pub fn field(&self, name: &str) -> Result<Option<String>> {
        Ok(match name {
            "rpc_url" => self.rpc_url.clone(),
            "chain_id" => Some(self.chain_id.to_string()),
            "etherscan_base_url" => Some(self.etherscan_base_url.clone()),
            "poll_interval_secs" => Some(self.poll_interval_secs.to_string()),
            "safe_address" => self.safe_address.clone(),
            "default_wallet" => self.default_wallet.clone(),
            other => return Err(SettingsError::UnknownField(other.to_string()).into()),
        })
    }

    /// Parse and set one field. An empty value clears an optional field.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<()> {
        let raw = raw.trim();
        match name {
            "rpc_url" => {
                self.rpc_url = optional(raw, |v| url(name, v, &["http", "https", "ws", "wss"]))?;
            }
            "chain_id" => self.chain_id = positive(name, raw)?,
            "etherscan_base_url" => {
                self.etherscan_base_url = url(name, raw, &["http", "https"])?;
            }
            "poll_interval_secs" => self.poll_interval_secs = positive(name, raw)?,
            "safe_address" => self.safe_address = optional(raw, |v| address(name, v))?,
            "default_wallet" => self.default_wallet = optional(raw, |v| Ok(v.to_string()))?,
            other => return Err(SettingsError::UnknownField(other.to_string()).into()),
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> SettingsError {
    SettingsError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn optional(raw: &str, parse: impl FnOnce(&str) -> Result<String>) -> Result<Option<String>> {
    if raw.is_empty() {
        return Ok(None);
    }
    parse(raw).map(Some)
}

fn positive(field: &str, raw: &str) -> Result<u64> {
    match raw.parse::<u64>() {
        Ok(0) => Err(invalid(field, "must be greater than zero").into()),
        Ok(n) => Ok(n),
        Err(_) => Err(invalid(field, format!("'{}' is not a positive integer", raw)).into()),
    }
}

fn url(field: &str, raw: &str, schemes: &[&str]) -> Result<String> {
    let scheme_ok = raw
        .split_once("://")
        .map(|(scheme, rest)| schemes.contains(&scheme) && !rest.is_empty())
        .unwrap_or(false);
    if !scheme_ok {
        return Err(invalid(field, format!("expected a {} URL", schemes.join("/"))).into());
    }
    Ok(raw.to_string())
}

fn address(field: &str, raw: &str) -> Result<String> {
    let hex = raw
        .strip_prefix("0x")
        .ok_or_else(|| invalid(field, "address must start with 0x"))?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid(field, "address must be 40 hex digits after 0x").into());
    }
    Ok(raw.to_string())
}

/// Typed settings documents over a keyring manager.
pub struct SettingsStore<'a> {
    keyring: &'a KeyringManager,
}

impl<'a> SettingsStore<'a> {
    pub fn new(keyring: &'a KeyringManager) -> Self {
        Self { keyring }
    }

    /// Load document `name`, or its default if it was never saved.
    pub async fn load<T>(&self, name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self
            .keyring
            .get(name, Some(constants::SETTINGS_NAMESPACE))
            .await?
        {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => {
                debug!(document = name, "settings document not found, using defaults");
                Ok(T::default())
            }
        }
    }

    /// Save document `name`, replacing any previous version.
    pub async fn save<T: Serialize>(&self, name: &str, document: &T) -> Result<()> {
        let raw = serde_json::to_string(document)?;
        self.keyring
            .set(name, &raw, Some(constants::SETTINGS_NAMESPACE))
            .await
    }

    pub async fn load_app(&self) -> Result<AppSettings> {
        self.load(APP_DOCUMENT).await
    }

    pub async fn save_app(&self, settings: &AppSettings) -> Result<()> {
        self.save(APP_DOCUMENT, settings).await
    }

    pub async fn get_field(&self, field: &str) -> Result<Option<String>> {
        self.load_app().await?.field(field)
    }

    /// Validate and persist one field of the application settings.
    pub async fn set_field(&self, field: &str, value: &str) -> Result<AppSettings> {
        let mut settings = self.load_app().await?;
        settings.set_field(field, value)?;
        self.save_app(&settings).await?;
        Ok(settings)
    }

    /// Drop the stored application settings so defaults apply again.
    pub async fn reset(&self) -> Result<()> {
        self.keyring
            .delete(APP_DOCUMENT, Some(constants::SETTINGS_NAMESPACE))
            .await?;
        Ok(())
    }
}
