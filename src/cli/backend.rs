//! Backend command: show or switch the active backend.

use crate::cli::output;
use crate::core::store::BackendKind;
use crate::core::vault::Vault;
use crate::error::Result;

/// Show the active backend, or switch and record the preference in
/// `.gnoman.toml`.
pub async fn execute(vault: &Vault, name: Option<BackendKind>) -> Result<()> {
    let Some(requested) = name else {
        output::header("Keyring");
        match vault.active_backend().await {
            Some(active) => output::kv("backend:  ", active),
            None => output::kv("backend:  ", "none"),
        }
        output::kv("namespace:", vault.keyring().namespace().await);
        output::kv("service:  ", vault.config().service());
        output::kv("store:    ", vault.config().store_path().display());
        return Ok(());
    };

    let active = vault.keyring().switch_backend(requested).await?;
    if active == requested {
        output::success(&format!("active backend: {}", active));
    } else {
        output::warn(&format!("{} unavailable, fell back to {}", requested, active));
    }

    let mut config = vault.config().clone();
    config.vault.backend = Some(requested);
    config.save()?;
    output::dimmed(&format!("preference saved to {}", config.project_file().display()));
    Ok(())
}
