//! Settings commands (show, get, set, reset).

use crate::cli::output;
use crate::core::settings::AppSettings;
use crate::core::vault::Vault;
use crate::error::Result;

pub async fn show(vault: &Vault, json: bool) -> Result<()> {
    let settings = vault.settings().load_app().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    output::header("Settings");
    for field in AppSettings::FIELDS {
        let value = settings.field(field)?.unwrap_or_else(|| "(unset)".to_string());
        output::kv(&format!("{:<20}", field), value);
    }
    Ok(())
}

pub async fn get(vault: &Vault, field: &str) -> Result<()> {
    match vault.settings().get_field(field).await? {
        Some(value) => println!("{}", value),
        None => output::dimmed("(unset)"),
    }
    Ok(())
}

pub async fn set(vault: &Vault, field: &str, value: &str) -> Result<()> {
    let settings = vault.settings().set_field(field, value).await?;
    match settings.field(field)? {
        Some(value) => output::success(&format!("{} = {}", field, value)),
        None => output::success(&format!("{} cleared", field)),
    }
    Ok(())
}

pub async fn reset(vault: &Vault) -> Result<()> {
    vault.settings().reset().await?;
    output::success("settings reset to defaults");
    Ok(())
}
