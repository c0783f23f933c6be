// crates/attestguard-api/src/state.rs
// ============================================================================
// Module: API State
// Description: Shared handles every C10 route needs.
// Purpose: One `Arc<ApiState>` threaded through axum's `State` extractor.
// Dependencies: attestguard-blob, attestguard-queue, attestguard-store
// ============================================================================

use std::sync::Arc;

use attestguard_blob::S3BlobStore;
use attestguard_queue::TaskQueue;
use attestguard_store::PostgresStore;
use attestguard_sync::SyncEngine;

/// Shared state for the HTTP task API.
pub struct ApiState {
    /// Durable task/app/profile store.
    pub store: Arc<PostgresStore>,
    /// Blob store, read here to serve uploaded reports.
    pub blob: Arc<S3BlobStore>,
    /// Worker-pool handle, used to enqueue/cancel tasks.
    pub queue: Arc<TaskQueue>,
    /// Analytics-sync engine, driven by the cron-trigger routes.
    pub sync: Arc<SyncEngine>,
    /// Key demanded on cron-trigger endpoints (`CRON_API_KEY`).
    pub cron_api_key: String,
}
