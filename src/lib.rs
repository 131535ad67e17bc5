//! gnoman - a local credential vault for wallet, Safe and explorer tooling.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── secrets       # get / set / rm / list
//! │   ├── backend       # Show or switch the active backend
//! │   ├── resolve       # Explain where a secret comes from
//! │   ├── settings      # Application settings
//! │   ├── audit         # Audit log tail
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # .gnoman.toml and environment overrides
//!     ├── store/        # Storage backends
//!     │   ├── mod       # Backend trait, BackendKind cascade
//!     │   ├── backend   # Backend factory
//!     │   ├── keychain  # Native OS credential manager
//!     │   ├── fs        # AES-256-GCM encrypted file
//!     │   └── memory    # Volatile in-process map
//!     ├── keyring       # Keyring manager (fallback, cache, audit)
//!     ├── resolver      # env → project file → encrypted file → keychain
//!     ├── audit         # Masked append-only audit log
//!     ├── settings      # Typed settings documents
//!     └── vault         # Process-wide context object
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gnoman::core::config::Config;
//! use gnoman::core::env::Environment;
//! use gnoman::core::resolver::ResolveOptions;
//! use gnoman::core::vault::Vault;
//!
//! # async fn run() -> gnoman::error::Result<()> {
//! let env = Environment::Process;
//! let vault = Vault::open(Config::load(&env)?, env).await?;
//!
//! vault.keyring().set("RPC_URL", "https://rpc.example", None).await?;
//! let key = vault
//!     .resolver()
//!     .resolve("ETHERSCAN_API_KEY", ResolveOptions::required())
//!     .await?;
//! println!("from {}", key.source);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;
