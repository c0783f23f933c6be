// crates/attestguard-cli/src/error.rs
// ============================================================================
// Module: CLI Errors
// Description: Closed error enum mapping onto spec.md §4.10's exit codes.
// Purpose: Give every subcommand one `Result<_, CliError>` return type.
// Dependencies: attestguard-config, attestguard-queue, attestguard-store,
//              attestguard-sync, thiserror
// ============================================================================

use attestguard_blob::BlobStoreError;
use attestguard_config::ConfigError;
use attestguard_queue::QueueError;
use attestguard_store::StoreError;
use attestguard_sync::SyncError;

/// Errors surfaced by `attestguard` subcommands, each with its spec.md
/// §4.10 exit code.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Caller-supplied input was malformed or named an unknown resource
    /// (exit code `2`).
    #[error("validation error: {0}")]
    Validation(String),
    /// A downstream dependency (store, blob, queue, sync source) is
    /// unavailable (exit code `3`).
    #[error("downstream unavailable: {0}")]
    Unavailable(String),
    /// Required authorisation was missing or rejected (exit code `4`).
    #[error("authorisation rejected: {0}")]
    Unauthorized(String),
}

impl CliError {
    /// Maps this error onto its spec.md §4.10 exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Unavailable(_) => 3,
            Self::Unauthorized(_) => 4,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(message) => Self::Validation(message),
            StoreError::Conflict(message) | StoreError::InvalidTransition(message) => {
                Self::Validation(message)
            }
            StoreError::Invalid(message) => Self::Validation(message),
            StoreError::Io(message) => Self::Unavailable(message),
        }
    }
}

impl From<QueueError> for CliError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Store(inner) => inner.into(),
            QueueError::Blob(message) => Self::Unavailable(message.to_string()),
            QueueError::InvalidTask(message) => Self::Validation(message),
            QueueError::Exhausted(message) => Self::Unavailable(message),
        }
    }
}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<BlobStoreError> for CliError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            BlobStoreError::Invalid(message) => Self::Validation(message),
            BlobStoreError::Io(message) | BlobStoreError::Serialize(message) => Self::Unavailable(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliError;

    #[test]
    fn validation_maps_to_exit_code_two() {
        assert_eq!(CliError::Validation("x".to_string()).exit_code(), 2);
    }

    #[test]
    fn unavailable_maps_to_exit_code_three() {
        assert_eq!(CliError::Unavailable("x".to_string()).exit_code(), 3);
    }

    #[test]
    fn unauthorized_maps_to_exit_code_four() {
        assert_eq!(CliError::Unauthorized("x".to_string()).exit_code(), 4);
    }
}
