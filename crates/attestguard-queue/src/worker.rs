// crates/attestguard-queue/src/worker.rs
// ============================================================================
// Module: Task Execution
// Description: Runs one claimed task through C5 and records its outcome (C7).
// Purpose: Implement spec.md §4.7's "Execution" steps for a single job.
// Dependencies: attestguard-blob, attestguard-core, attestguard-service,
//              attestguard-store, attestguard-verifiers
// ============================================================================

//! ## Overview
//! [`run_claimed_task`] assumes its caller already transitioned the task row
//! to `active` (via [`attestguard_store::PostgresStore::claim_next_pending_task`]).
//! It builds the `AppConfig`, runs C5's [`attestguard_service::verify`] on a
//! blocking thread (the call is synchronous, blocking HTTP/DNS/RPC I/O), and
//! finalizes the row: the report is uploaded either way (spec.md §7: a
//! failed run's partial data objects must still be visible to operators),
//! then the row transitions to `completed` with the blob triple and data
//! object ids on success, or `failed` with the first error's message
//! (plus the same partial blob triple) otherwise.
//! `verify` itself never returns an `Err` — a verification failure is a
//! `VerificationResponse { success: false, .. }`, not a thrown error, per
//! spec.md §4.7 "Verification errors ... are NOT retried".

use attestguard_blob::S3BlobStore;
use attestguard_core::TaskStatus;
use attestguard_core::VerificationTask;
use attestguard_store::PostgresStore;
use attestguard_store::TaskPatch;
use attestguard_verifiers::VerifierClients;

use crate::app_config::build_app_config;
use crate::error::QueueError;

/// Runs one already-`active` task to completion, persisting the outcome.
///
/// # Errors
///
/// Returns [`QueueError::InvalidTask`] when the task has no reachable
/// application row, or [`QueueError::Store`]/[`QueueError::Blob`] when
/// persistence fails.
pub fn run_claimed_task(
    store: &PostgresStore,
    blob: &S3BlobStore,
    clients: &VerifierClients,
    task: &VerificationTask,
) -> Result<(), QueueError> {
    let app_id = task
        .app_id
        .as_ref()
        .ok_or_else(|| QueueError::InvalidTask(format!("task {} has no app_id", task.id)))?;
    let app = store
        .get_app(app_id)?
        .ok_or_else(|| QueueError::InvalidTask(format!("app {app_id} not found for task {}", task.id)))?;
    let config = build_app_config(&app, task)?;

    let response = attestguard_service::verify(clients, config, Some(task.flags));

    // Reports always include whatever data objects were registered before a
    // failure (spec.md §7), so the partial report is uploaded regardless of
    // `success` and operators can see how far verification progressed.
    let report = serde_json::to_value(&response).map_err(|err| QueueError::InvalidTask(err.to_string()))?;
    let blob_ref = blob.upload_json(&report)?;

    if response.success {
        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            blob_ref: Some(blob_ref),
            data_object_ids: Some(response.data_object_ids()),
            touch_finished: true,
            ..TaskPatch::default()
        };
        store.update_task(&task.id, &patch)?;
    } else {
        let message = response
            .errors
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(|| "verification failed".to_string());
        let patch = TaskPatch {
            status: Some(TaskStatus::Failed),
            error_message: Some(Some(message)),
            blob_ref: Some(blob_ref),
            data_object_ids: Some(response.data_object_ids()),
            touch_finished: true,
            ..TaskPatch::default()
        };
        store.update_task(&task.id, &patch)?;
    }
    Ok(())
}
