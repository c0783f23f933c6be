// crates/attestguard-queue/src/error.rs
// ============================================================================
// Module: Queue Errors
// Description: Closed error enum for the worker-pool task queue (C7).
// Purpose: Distinguish store/blob plumbing failures from verification outcomes.
// Dependencies: attestguard-blob, attestguard-store, thiserror
// ============================================================================

use thiserror::Error;

/// Errors raised by `attestguard-queue`.
///
/// A verification-level failure (`VerificationResponse.success == false`) is
/// NOT represented here: it is a normal, recorded outcome (spec.md §4.7
/// "Retry"), not a queue error.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The durable store returned an error.
    #[error("queue store error: {0}")]
    Store(#[from] attestguard_store::StoreError),
    /// The blob store returned an error while uploading a report.
    #[error("queue blob error: {0}")]
    Blob(#[from] attestguard_blob::BlobStoreError),
    /// The task row did not carry enough information to build an `AppConfig`.
    #[error("queue task invalid: {0}")]
    InvalidTask(String),
    /// The job function itself failed (not a verification-level error), after
    /// exhausting all retry attempts.
    #[error("queue job exhausted retries: {0}")]
    Exhausted(String),
}
