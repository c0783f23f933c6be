// crates/attestguard-sync/src/error.rs
// ============================================================================
// Module: Sync Errors
// Description: Closed error enum for the analytics-sync cron loops (C9).
// Purpose: Distinguish transport failures from malformed upstream payloads.
// Dependencies: attestguard-clients, attestguard-store, thiserror
// ============================================================================

use attestguard_clients::ClientError;
use attestguard_queue::QueueError;
use attestguard_store::StoreError;

/// Errors raised while running a profile or app sync tick.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The analytics endpoint could not be reached or returned a non-2xx status.
    #[error("analytics fetch failed: {0}")]
    Fetch(#[from] ClientError),
    /// The response body was not valid JSON or did not match the expected shape.
    #[error("analytics payload invalid: {0}")]
    InvalidPayload(String),
    /// A derived field violated a documented constraint (e.g. an unparseable version).
    #[error("field derivation failed: {0}")]
    Derivation(String),
    /// The durable store rejected a read or write.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// Sync-driven enqueue of a verification task failed.
    #[error("enqueue failed: {0}")]
    Enqueue(#[from] QueueError),
}
