// crates/attestguard-queue/src/pool.rs
// ============================================================================
// Module: Task Queue Worker Pool
// Description: Bounded async dispatch loop over the durable task store (C7).
// Purpose: Implement spec.md §4.7's scheduling, enqueue, retry, pause/resume,
//          and cancellation model with Postgres as the queue of record.
// Dependencies: attestguard-blob, attestguard-core, attestguard-store,
//              attestguard-verifiers, tokio
// ============================================================================

//! ## Overview
//! `TaskQueue` is a bounded pool of `concurrency` worker fibers (spec.md
//! §4.7 "Scheduling model"). Its dispatch loop polls
//! [`attestguard_store::PostgresStore::claim_next_pending_task`] — the
//! `SELECT ... FOR UPDATE SKIP LOCKED` pickup that stands in for a
//! Redis-backed queue in this corpus (see DESIGN.md) — and spawns one
//! blocking task per picked-up job, bounded by a [`tokio::sync::Semaphore`]
//! sized to `concurrency`. A thrown job-function failure (anything other
//! than a recorded verification failure) is retried up to `max_attempts`
//! times with exponential backoff; a verification-level failure is recorded
//! and the job completes from the queue's perspective without retrying
//! (spec.md §4.7 "Retry").

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use attestguard_blob::S3BlobStore;
use attestguard_core::AppId;
use attestguard_core::TaskId;
use attestguard_core::VerificationFlags;
use attestguard_core::VerificationTask;
use attestguard_store::PostgresStore;
use attestguard_verifiers::VerifierClients;
use tokio::sync::Semaphore;

use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::worker::run_claimed_task;

/// The bounded worker pool driving C7's execution loop.
pub struct TaskQueue {
    /// Durable store; also the queue of record.
    store: Arc<PostgresStore>,
    /// Blob store for uploaded reports.
    blob: Arc<S3BlobStore>,
    /// Bundle of C2 adapters passed through to every verification run.
    clients: VerifierClients,
    /// Worker-pool sizing and retry tuning.
    config: QueueConfig,
    /// Cooperative pause flag; checked before each new claim.
    paused: Arc<AtomicBool>,
    /// Bounds the number of concurrently in-flight jobs to `config.concurrency`.
    semaphore: Arc<Semaphore>,
}

impl TaskQueue {
    /// Builds a new worker pool over `store`/`blob`/`clients`.
    #[must_use]
    pub fn new(
        store: Arc<PostgresStore>,
        blob: Arc<S3BlobStore>,
        clients: VerifierClients,
        config: QueueConfig,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.concurrency));
        Self {
            store,
            blob,
            clients,
            config,
            paused: Arc::new(AtomicBool::new(false)),
            semaphore,
        }
    }

    /// Enqueues a new task for `app_id` (spec.md §4.7 "Enqueue").
    ///
    /// Since the durable queue of record is `verification_tasks.status`
    /// itself, enqueueing is the insert: a fresh `pending` row is
    /// immediately visible to every worker's dispatch loop. The task's own
    /// id is recorded as its `queue_job_id`, preserving the
    /// `jobId == postgresTaskId` invariant spec.md §4.7 calls for, even
    /// though there is no separate broker assigning a distinct job id.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Store`] when the insert fails.
    pub fn add_task(
        &self,
        app_id: &AppId,
        app_metadata: Option<serde_json::Value>,
        flags: VerificationFlags,
    ) -> Result<TaskId, QueueError> {
        let task = self.store.create_task(Some(app_id), app_metadata, flags)?;
        self.store.set_task_job_id(&task.id, task.id.as_str())?;
        Ok(task.id)
    }

    /// Removes a job from the queue if it has not yet been picked up
    /// (spec.md §4.7 "Cancellation"). Picked-up (`active`) jobs are not
    /// pre-empted; their completion is unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Store`] when the task does not exist or is
    /// `active`.
    pub fn remove_job(&self, id: &TaskId) -> Result<(), QueueError> {
        self.store.delete_task(id)?;
        Ok(())
    }

    /// Cooperatively pauses the dispatch loop: no new jobs are claimed, but
    /// in-flight jobs run to completion (spec.md §4.7 "Pause / resume / clean").
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Resumes claiming new jobs.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Runs the dispatch loop until cancelled via `shutdown`.
    ///
    /// Polls for a pending task every `poll_interval_ms` while not paused;
    /// each claimed task is run on a blocking thread, bounded by the
    /// worker-pool semaphore.
    pub async fn run(&self, shutdown: &tokio::sync::Notify) {
        loop {
            if self.paused.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
                continue;
            }
            let Ok(permit) = Arc::clone(&self.semaphore).acquire_owned().await else {
                break;
            };
            let claimed = self.store.claim_next_pending_task();
            match claimed {
                Ok(Some(task)) => {
                    let store = Arc::clone(&self.store);
                    let blob = Arc::clone(&self.blob);
                    let clients = self.clients.clone();
                    let config = self.config.clone();
                    tokio::task::spawn_blocking(move || {
                        let _permit = permit;
                        run_with_retry(&store, &blob, &clients, &task, &config);
                    });
                }
                Ok(None) => {
                    drop(permit);
                    tokio::select! {
                        () = tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)) => {}
                        () = shutdown.notified() => break,
                    }
                }
                Err(error) => {
                    drop(permit);
                    tracing::warn!(%error, "failed to poll for pending tasks");
                    tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
                }
            }
        }
    }

    /// Runs the reaper pass once (spec.md §5), flipping stale `active`
    /// tasks to `failed`. Intended to be called from a periodic cron
    /// alongside [`Self::run`].
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Store`] when the update fails.
    pub fn reap_stale_tasks(&self) -> Result<u64, QueueError> {
        let grace = time::Duration::seconds(i64::try_from(self.config.reap_grace_secs).unwrap_or(i64::MAX));
        Ok(self.store.reap_stale_active_tasks(grace)?)
    }
}

/// Runs one claimed task, retrying a thrown job-function failure with
/// exponential backoff up to `config.max_attempts` times. A recorded
/// verification failure (`Ok(())` from [`run_claimed_task`], since the
/// task row was already updated to `failed`) is never retried.
fn run_with_retry(
    store: &PostgresStore,
    blob: &S3BlobStore,
    clients: &VerifierClients,
    task: &VerificationTask,
    config: &QueueConfig,
) {
    let mut attempt = 1;
    loop {
        match run_claimed_task(store, blob, clients, task) {
            Ok(()) => return,
            Err(error) if attempt >= config.max_attempts => {
                tracing::error!(%error, task_id = %task.id, attempt, "task job exhausted retries");
                let _ = store.update_task(
                    &task.id,
                    &attestguard_store::TaskPatch {
                        status: Some(attestguard_core::TaskStatus::Failed),
                        error_message: Some(Some(error.to_string())),
                        touch_finished: true,
                        ..attestguard_store::TaskPatch::default()
                    },
                );
                return;
            }
            Err(error) => {
                tracing::warn!(%error, task_id = %task.id, attempt, "task job failed, retrying");
                let backoff = config.backoff_for_attempt(attempt);
                std::thread::sleep(Duration::from_millis(backoff));
                attempt += 1;
            }
        }
    }
}
