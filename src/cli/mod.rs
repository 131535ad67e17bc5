//! Command-line interface.

pub mod audit;
pub mod backend;
pub mod completions;
pub mod output;
pub mod resolve;
pub mod secrets;
pub mod settings;

use clap::{Parser, Subcommand};

use crate::core::config::Config;
use crate::core::env::Environment;
use crate::core::store::BackendKind;
use crate::core::vault::Vault;
use crate::error::Result;

/// gnoman - local credential vault for wallet, Safe and explorer tooling.
#[derive(Parser)]
#[command(
    name = "gnoman",
    about = "Local credential vault with encrypted storage and keychain fallback",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Preferred backend (native, encrypted-file, volatile)
    #[arg(long, global = true, env = "GNOMAN_BACKEND")]
    pub backend: Option<BackendKind>,

    /// Namespace for keyring operations
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Get a secret value
    Get {
        /// Secret key (e.g., ETHERSCAN_API_KEY)
        key: String,
    },

    /// Set a secret value
    Set {
        /// Secret key
        key: String,
        /// Secret value (read from stdin or prompted for when omitted)
        value: Option<String>,
    },

    /// Remove a secret
    Rm {
        /// Secret key
        key: String,
    },

    /// List secrets with masked previews
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the active backend, or switch to another one
    Backend {
        /// Backend to switch to
        name: Option<BackendKind>,
    },

    /// Resolve a secret through env, project file and stores
    Resolve {
        /// Secret key
        key: String,
        /// Fail when no source has a value
        #[arg(long)]
        required: bool,
        /// Report a missing required secret instead of failing
        #[arg(long)]
        no_fail_closed: bool,
        /// Print the resolved value
        #[arg(long)]
        reveal: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage application settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Show recent audit records
    Audit {
        /// Number of records to show
        #[arg(short = 'l', long, default_value_t = 20)]
        lines: usize,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Settings subcommands.
#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show all settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one setting
    Get {
        /// Setting name (e.g., rpc_url)
        field: String,
    },

    /// Change one setting (an empty value clears optional settings)
    Set {
        /// Setting name
        field: String,
        /// New value
        value: String,
    },

    /// Restore default settings
    Reset,
}

/// Execute a command.
pub async fn execute(cli: Cli) -> Result<()> {
    use Command::*;

    let env = Environment::Process;

    // Commands that never touch the keyring manager.
    match &cli.command {
        Completions { shell } => return completions::execute(shell.clone()),
        Audit { lines } => {
            let config = load_config(&cli, &env)?;
            return audit::execute(&config, *lines).await;
        }
        Resolve {
            key,
            required,
            no_fail_closed,
            reveal,
            json,
        } => {
            let config = load_config(&cli, &env)?;
            let options = resolve::options(*required, *no_fail_closed);
            return resolve::execute(
                &config,
                &env,
                key,
                cli.namespace.as_deref(),
                options,
                *reveal,
                *json,
            )
            .await;
        }
        _ => {}
    }

    let config = load_config(&cli, &env)?;
    let vault = Vault::open(config, env).await?;
    if let Some(namespace) = &cli.namespace {
        vault.keyring().switch_namespace(namespace).await?;
    }

    let result = match cli.command {
        Get { key } => secrets::get(&vault, &key).await,
        Set { key, value } => secrets::set(&vault, &key, value).await,
        Rm { key } => secrets::rm(&vault, &key).await,
        List { json } => secrets::list(&vault, json).await,
        Backend { name } => backend::execute(&vault, name).await,
        Settings { action } => match action {
            SettingsAction::Show { json } => settings::show(&vault, json).await,
            SettingsAction::Get { field } => settings::get(&vault, &field).await,
            SettingsAction::Set { field, value } => settings::set(&vault, &field, &value).await,
            SettingsAction::Reset => settings::reset(&vault).await,
        },
        Completions { .. } | Audit { .. } | Resolve { .. } => Ok(()),
    };

    vault.close().await?;
    result
}

fn load_config(cli: &Cli, env: &Environment) -> Result<Config> {
    let mut config = Config::load(env)?;
    if let Some(kind) = cli.backend {
        config.set_preferred_backend(kind);
    }
    Ok(config)
}
