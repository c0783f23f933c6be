// crates/attestguard-config/src/error.rs
// ============================================================================
// Module: Config Errors
// Description: Closed error enum for environment-variable configuration loading.
// Purpose: Distinguish a missing variable from one present but malformed.
// Dependencies: thiserror
// ============================================================================

/// Errors raised while loading configuration from the process environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("missing required environment variable {0}")]
    Missing(String),
    /// An environment variable was set but could not be parsed or was out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
