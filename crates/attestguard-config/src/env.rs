// crates/attestguard-config/src/env.rs
// ============================================================================
// Module: Environment Variable Helpers
// Description: Typed accessors over `std::env::var` with fail-closed parsing.
// Purpose: Give every config section the same read/parse/validate idiom.
// Dependencies: crate::error
// ============================================================================

use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

/// Reads a required environment variable.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] when `name` is unset, and
/// [`ConfigError::Invalid`] when it is set but not valid Unicode.
pub(crate) fn required(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) => Ok(value),
        Err(env::VarError::NotPresent) => Err(ConfigError::Missing(name.to_string())),
        Err(env::VarError::NotUnicode(_)) => {
            Err(ConfigError::Invalid(format!("{name} is not valid unicode")))
        }
    }
}

/// Reads an optional environment variable, returning `None` when unset.
pub(crate) fn optional(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Reads an optional environment variable and parses it as `T`, falling back
/// to `default` when unset.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the variable is set but does not
/// parse as `T`.
pub(crate) fn parse_or<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => {
            value.parse().map_err(|_| ConfigError::Invalid(format!("{name} is not a valid value")))
        }
        Err(_) => Ok(default),
    }
}

/// Splits a CSV environment variable into a list of trimmed, non-empty
/// entries, returning an empty `Vec` when unset.
pub(crate) fn csv(name: &str) -> Vec<String> {
    env::var(name)
        .ok()
        .map(|value| value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}
