//! Secret management commands (get, set, rm, list).

use std::io::{IsTerminal, Read};

use dialoguer::Password;

use crate::cli::output;
use crate::core::store::BackendKind;
use crate::core::vault::Vault;
use crate::error::{Result, SecretError};

/// Print a secret value.
pub async fn get(vault: &Vault, key: &str) -> Result<()> {
    match vault.keyring().get(key, None).await? {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => Err(SecretError::NotFound(key.to_string()).into()),
    }
}

/// Store a secret. Without a value argument it is read from piped stdin,
/// or prompted for without echo on a terminal.
pub async fn set(vault: &Vault, key: &str, value: Option<String>) -> Result<()> {
    let value = match value {
        Some(value) => value,
        None => read_value(key)?,
    };

    vault.keyring().set(key, &value, None).await?;
    output::success(&format!("set {}", output::key(key)));
    report_backend(vault).await;
    Ok(())
}

fn read_value(key: &str) -> Result<String> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        let value = Password::new()
            .with_prompt(format!("Value for {}", key))
            .interact()?;
        return Ok(value);
    }

    let mut buf = String::new();
    stdin.lock().read_to_string(&mut buf)?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}

/// Remove a secret.
pub async fn rm(vault: &Vault, key: &str) -> Result<()> {
    if vault.keyring().delete(key, None).await? {
        output::success(&format!("removed {}", output::key(key)));
        Ok(())
    } else {
        Err(SecretError::NotFound(key.to_string()).into())
    }
}

/// List secrets in the current namespace with masked previews.
pub async fn list(vault: &Vault, json: bool) -> Result<()> {
    let namespace = vault.keyring().namespace().await;
    let summaries = vault.keyring().list(None).await?;

    if json {
        let output = serde_json::json!({
            "namespace": namespace,
            "backend": vault.active_backend().await,
            "secrets": summaries,
            "count": summaries.len(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if summaries.is_empty() {
        output::dimmed(&format!("no secrets stored in {}", namespace));
    } else {
        output::header(&format!(
            "{} {} in {}",
            summaries.len(),
            output::pluralize("secret", summaries.len()),
            namespace
        ));
        for summary in &summaries {
            println!("  {}  {}", output::key(&summary.key), summary.preview);
        }
    }

    Ok(())
}

/// Warn when writes land in a store that does not persist.
async fn report_backend(vault: &Vault) {
    if vault.active_backend().await == Some(BackendKind::Volatile) {
        output::warn("volatile backend active: this value is lost when the process exits");
    }
}
