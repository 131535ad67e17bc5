//! Resolve command: explain where a secret's effective value comes from.

use crate::cli::output;
use crate::core::config::Config;
use crate::core::env::Environment;
use crate::core::resolver::{ResolveOptions, SecretResolver};
use crate::core::store::StandardBackends;
use crate::error::Result;

pub fn options(required: bool, no_fail_closed: bool) -> ResolveOptions {
    ResolveOptions {
        required,
        fail_closed: !no_fail_closed,
    }
}

/// Resolve `key` and print its source and the sources checked.
pub async fn execute(
    config: &Config,
    env: &Environment,
    key: &str,
    namespace: Option<&str>,
    options: ResolveOptions,
    reveal: bool,
    json: bool,
) -> Result<()> {
    let backends = StandardBackends::from_config(config);
    let mut resolver = SecretResolver::from_config(config, env, &backends);
    if let Some(namespace) = namespace {
        resolver = resolver.with_namespace(namespace)?;
    }
    let resolution = resolver.resolve(key, options).await?;

    let checked: Vec<String> = resolution.checked.iter().map(|s| s.to_string()).collect();

    if json {
        let mut output = serde_json::to_value(&resolution)?;
        if reveal {
            output["value"] = serde_json::json!(resolution.value());
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if reveal {
        match resolution.value() {
            Some(value) => println!("{}", value),
            None => output::warn(&format!("{} not found", key)),
        }
    } else {
        output::header(&output::key(key));
        output::kv("source: ", resolution.source);
        output::kv("checked:", checked.join(", "));
        if !resolver.is_interactive() {
            output::dimmed("  native keychain skipped: no interactive session");
        }
    }

    Ok(())
}
