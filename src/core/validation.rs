//! Input validation for keyring operations.
//!
//! Validates secret keys, namespaces, values, and file permissions.

use crate::core::types::{SecretId, NAMESPACE_SEPARATOR};
use crate::error::{Result, ValidationError};

/// Maximum length of a key or namespace.
const MAX_NAME_LEN: usize = 256;

/// Validate a secret key name.
///
/// Keys are caller-defined strings:
/// - Cannot be empty or whitespace only
/// - Cannot contain control characters
/// - At most 256 characters
///
/// # Errors
///
/// Returns `ValidationError` if the key is invalid.
pub fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(ValidationError::EmptyKey.into());
    }

    if key.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::InvalidKey {
            key: key.chars().take(16).collect::<String>() + "...",
            reason: format!("longer than {} characters", MAX_NAME_LEN),
        }
        .into());
    }

    if let Some((i, ch)) = key.chars().enumerate().find(|(_, c)| c.is_control()) {
        return Err(ValidationError::InvalidKey {
            key: key.escape_default().to_string(),
            reason: format!(
                "control character {:?} at position {}",
                ch,
                i + 1
            ),
        }
        .into());
    }

    Ok(())
}

/// Validate a namespace name.
///
/// Namespaces follow the key rules and additionally cannot contain `:`,
/// which separates namespace and key in storage keys.
///
/// # Errors
///
/// Returns `ValidationError::InvalidNamespace` if the namespace is invalid.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    let invalid = |reason: &str| -> crate::error::Error {
        ValidationError::InvalidNamespace {
            namespace: namespace.escape_default().to_string(),
            reason: reason.to_string(),
        }
        .into()
    };

    if namespace.trim().is_empty() {
        return Err(invalid("cannot be empty"));
    }
    if namespace.chars().count() > MAX_NAME_LEN {
        return Err(invalid("too long"));
    }
    if namespace.contains(NAMESPACE_SEPARATOR) {
        return Err(invalid("cannot contain ':'"));
    }
    if namespace.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(invalid("cannot contain whitespace or control characters"));
    }

    Ok(())
}

/// Validate and build a [`SecretId`].
pub fn secret_id(namespace: &str, key: &str) -> Result<SecretId> {
    validate_namespace(namespace)?;
    validate_key(key)?;
    Ok(SecretId::new(namespace, key))
}

/// Validate a secret value.
///
/// Secret values cannot be empty.
pub fn validate_value(key: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ValidationError::EmptyValue(key.to_string()).into());
    }

    Ok(())
}

/// Validate file permissions (Unix only).
///
/// Checks that a file has the expected permissions mode.
#[cfg(unix)]
pub fn validate_file_permissions(path: &std::path::Path, expected_mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)?;
    let actual_mode = metadata.permissions().mode() & 0o777;

    if actual_mode != expected_mode {
        return Err(ValidationError::InvalidPermissions {
            path: path.display().to_string(),
            expected: format!("{:o}", expected_mode),
            actual: format!("{:o}", actual_mode),
        }
        .into());
    }

    Ok(())
}
