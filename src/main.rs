//! gnoman - local credential vault.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gnoman::cli::output;
use gnoman::cli::{execute, Cli};
use gnoman::core::constants::env as vars;
use gnoman::error::{ConfigError, Error, SecretError, StoreError};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(vars::LOG).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("gnoman=debug")
        } else {
            EnvFilter::new("gnoman=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli).await {
        output::error(&e.to_string());
        if let Some(hint) = suggestion(&e) {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}

fn suggestion(e: &Error) -> Option<&'static str> {
    match e {
        Error::Store(StoreError::NoAvailableBackend { .. }) => {
            Some("check that the encrypted store is readable, or run with: --backend volatile")
        }
        Error::Store(StoreError::Unavailable { .. }) => Some("run with --verbose for details"),
        Error::Secret(SecretError::MissingRequired { .. }) => {
            Some("export it, add it under [secrets] in .gnoman.toml, or run: gnoman set <KEY>")
        }
        Error::Secret(SecretError::NotFound(_)) => Some("run: gnoman set <KEY>"),
        Error::Config(ConfigError::UnknownBackend(_)) => {
            Some("valid backends: native, encrypted-file, volatile")
        }
        _ => None,
    }
}
