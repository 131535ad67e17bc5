//! Environment variable access.
//!
//! Config overrides, session detection and the resolution cascade all read
//! the environment through [`Environment`], so tests can supply a fixed map
//! instead of mutating process-global state.

use std::collections::BTreeMap;

/// Source of environment variables.
#[derive(Debug, Clone, Default)]
pub enum Environment {
    /// The real process environment.
    #[default]
    Process,
    /// A fixed set of variables.
    Fixed(BTreeMap<String, String>),
}

impl Environment {
    /// Fixed environment from name/value pairs.
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Fixed(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Raw value of a variable, if set and valid unicode.
    pub fn var(&self, name: &str) -> Option<String> {
        match self {
            Self::Process => std::env::var(name).ok(),
            Self::Fixed(vars) => vars.get(name).cloned(),
        }
    }

    /// Trimmed value, treating empty and whitespace-only values as unset.
    pub fn non_empty(&self, name: &str) -> Option<String> {
        self.var(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Whether a variable is set to a non-empty value.
    pub fn is_set(&self, name: &str) -> bool {
        self.non_empty(name).is_some()
    }

    /// Boolean flag: `1`, `true`, `yes`, `on` are true; `0`, `false`, `no`,
    /// `off` are false; anything else is unset.
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.non_empty(name)?.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}
