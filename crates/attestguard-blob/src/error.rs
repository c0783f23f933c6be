// crates/attestguard-blob/src/error.rs
// ============================================================================
// Module: Blob Store Errors
// Description: Closed error enum for the S3-backed blob adapter.
// Purpose: Give C10/C7 one error vocabulary for upload/delete failures.
// Dependencies: thiserror
// ============================================================================

use thiserror::Error;

/// Errors raised by `attestguard-blob`.
#[derive(Debug, Error)]
pub enum BlobStoreError {
    /// The configuration failed validation (e.g. an empty bucket name).
    #[error("blob store invalid config: {0}")]
    Invalid(String),
    /// The S3 client or runtime returned an error.
    #[error("blob store io error: {0}")]
    Io(String),
    /// The value could not be serialized to JSON.
    #[error("blob store serialization error: {0}")]
    Serialize(String),
}
