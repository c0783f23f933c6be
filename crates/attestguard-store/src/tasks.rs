// crates/attestguard-store/src/tasks.rs
// ============================================================================
// Module: Verification Tasks Table
// Description: CRUD, dispatch pickup, and monotonic status transitions (C6).
// Purpose: Back C7's durable queue-of-record and C10's task API.
// Dependencies: attestguard-core, postgres, serde_json, uuid
// ============================================================================

//! ## Overview
//! `verification_tasks.status` is the durable queue of record (spec.md §9
//! "Durable queue + relational store coupling"): [`PostgresStore::claim_next_pending_task`]
//! performs the `SELECT ... FOR UPDATE SKIP LOCKED` pickup C7's workers use
//! instead of polling a separate broker. Every status-changing update goes
//! through [`PostgresStore::update_task`], which re-checks
//! [`attestguard_core::TaskStatus::can_transition_to`] against the row's
//! current status inside the same transaction that applies the patch, so a
//! racing writer can never skip or double-apply a transition.

use attestguard_core::AppId;
use attestguard_core::BlobRef;
use attestguard_core::TaskId;
use attestguard_core::TaskStatus;
use attestguard_core::Timestamp;
use attestguard_core::VerificationFlags;
use attestguard_core::VerificationTask;

use crate::error::StoreError;
use crate::store::PostgresStore;

/// A patch applied to one task row by [`PostgresStore::update_task`].
///
/// `None` leaves a field unchanged; `error_message: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// New status, validated against the current status's allowed transitions.
    pub status: Option<TaskStatus>,
    /// New error message (`Some(None)` clears it).
    pub error_message: Option<Option<String>>,
    /// New blob-store triple.
    pub blob_ref: Option<BlobRef>,
    /// New list of data-object ids present in the uploaded report.
    pub data_object_ids: Option<Vec<String>>,
    /// New opaque runtime app-metadata.
    pub app_metadata: Option<serde_json::Value>,
    /// Stamp `started_at = now` as part of this patch.
    pub touch_started: bool,
    /// Stamp `finished_at = now` as part of this patch.
    pub touch_finished: bool,
}

fn parse_status(value: &str) -> Result<TaskStatus, StoreError> {
    match value {
        "pending" => Ok(TaskStatus::Pending),
        "active" => Ok(TaskStatus::Active),
        "completed" => Ok(TaskStatus::Completed),
        "failed" => Ok(TaskStatus::Failed),
        "cancelled" => Ok(TaskStatus::Cancelled),
        other => Err(StoreError::Invalid(format!("unknown task status {other}"))),
    }
}

fn row_to_task(row: &postgres::Row) -> Result<VerificationTask, StoreError> {
    let app_id: Option<String> = row.get("app_id");
    let status: String = row.get("status");
    let flags_json: String = row.get("flags_json");
    let app_metadata: Option<String> = row.get("app_metadata");
    let data_object_ids_json: String = row.get("data_object_ids_json");
    let created_at: String = row.get("created_at");
    let started_at: Option<String> = row.get("started_at");
    let finished_at: Option<String> = row.get("finished_at");
    let blob_filename: Option<String> = row.get("blob_filename");
    let blob_key: Option<String> = row.get("blob_key");
    let blob_bucket: Option<String> = row.get("blob_bucket");

    let blob_ref = match (blob_filename, blob_key, blob_bucket) {
        (Some(filename), Some(key), Some(bucket)) => Some(BlobRef {
            filename,
            key,
            bucket,
        }),
        _ => None,
    };

    Ok(VerificationTask {
        id: TaskId::new(row.get::<_, String>("id")),
        app_id: app_id.map(AppId::new),
        job_name: row.get("job_name"),
        queue_job_id: row.get("queue_job_id"),
        app_metadata: app_metadata
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|err| StoreError::Invalid(err.to_string()))?,
        flags: serde_json::from_str::<VerificationFlags>(&flags_json)
            .map_err(|err| StoreError::Invalid(err.to_string()))?,
        status: parse_status(&status)?,
        error_message: row.get("error_message"),
        blob_ref,
        data_object_ids: serde_json::from_str(&data_object_ids_json)
            .map_err(|err| StoreError::Invalid(err.to_string()))?,
        created_at: Timestamp::parse(&created_at).map_err(|err| StoreError::Invalid(err.to_string()))?,
        started_at: started_at
            .map(|value| Timestamp::parse(&value))
            .transpose()
            .map_err(|err| StoreError::Invalid(err.to_string()))?,
        finished_at: finished_at
            .map(|value| Timestamp::parse(&value))
            .transpose()
            .map_err(|err| StoreError::Invalid(err.to_string()))?,
    })
}

impl PostgresStore {
    /// Inserts a new `pending` task for `app_id` (spec.md §4.6 `createTask`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on a database error.
    pub fn create_task(
        &self,
        app_id: Option<&AppId>,
        app_metadata: Option<serde_json::Value>,
        flags: VerificationFlags,
    ) -> Result<VerificationTask, StoreError> {
        let mut conn = self.connection()?;
        let id = TaskId::new(uuid::Uuid::new_v4().to_string());
        let now = Timestamp::now().to_rfc3339();
        let flags_json = serde_json::to_string(&flags).map_err(|err| StoreError::Invalid(err.to_string()))?;
        let app_metadata_json = app_metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        let row = conn
            .query_one(
                "INSERT INTO verification_tasks (id, app_id, job_name, queue_job_id, \
                 app_metadata, flags_json, status, created_at) VALUES ($1, $2, 'verification', \
                 NULL, $3, $4, 'pending', $5) RETURNING *",
                &[&id.as_str(), &app_id.map(AppId::as_str), &app_metadata_json, &flags_json, &now],
            )
            .map_err(|err| StoreError::Io(err.to_string()))?;
        row_to_task(&row)
    }

    /// Records the external queue job id for a task (equal to the task id by
    /// invariant; kept as a distinct column for API compatibility per
    /// spec.md §4.7).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on a database error.
    pub fn set_task_job_id(&self, id: &TaskId, job_id: &str) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        conn.execute(
            "UPDATE verification_tasks SET queue_job_id = $1 WHERE id = $2",
            &[&job_id, &id.as_str()],
        )
        .map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(())
    }

    /// Applies `patch` to task `id`, enforcing the monotonic status
    /// transition rule (spec.md §4.6) inside one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the task does not exist,
    /// [`StoreError::InvalidTransition`] when `patch.status` is not a valid
    /// transition from the current status, or [`StoreError::Io`] on a
    /// database error.
    pub fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<VerificationTask, StoreError> {
        let mut conn = self.connection()?;
        let mut tx = conn.transaction().map_err(|err| StoreError::Io(err.to_string()))?;
        let row = tx
            .query_opt("SELECT * FROM verification_tasks WHERE id = $1 FOR UPDATE", &[&id.as_str()])
            .map_err(|err| StoreError::Io(err.to_string()))?
            .ok_or_else(|| StoreError::NotFound(id.as_str().to_string()))?;
        let current = row_to_task(&row)?;

        let next_status = match patch.status {
            Some(requested) if requested == current.status => requested,
            Some(requested) if current.status.can_transition_to(requested) => requested,
            Some(requested) => {
                return Err(StoreError::InvalidTransition(format!(
                    "{} -> {requested}",
                    current.status
                )));
            }
            None => current.status,
        };

        let now = Timestamp::now().to_rfc3339();
        let error_message = match &patch.error_message {
            Some(value) => value.clone(),
            None => current.error_message.clone(),
        };
        let blob_ref = patch.blob_ref.clone().or(current.blob_ref.clone());
        let data_object_ids = patch.data_object_ids.clone().unwrap_or(current.data_object_ids.clone());
        let data_object_ids_json =
            serde_json::to_string(&data_object_ids).map_err(|err| StoreError::Invalid(err.to_string()))?;
        let app_metadata_json = match &patch.app_metadata {
            Some(value) => Some(serde_json::to_string(value).map_err(|err| StoreError::Invalid(err.to_string()))?),
            None => None,
        };
        let started_at = if patch.touch_started { Some(now.clone()) } else { None };
        let finished_at = if patch.touch_finished { Some(now.clone()) } else { None };

        tx.execute(
            "UPDATE verification_tasks SET status = $1, error_message = $2, blob_filename = $3, \
             blob_key = $4, blob_bucket = $5, data_object_ids_json = $6, app_metadata = \
             COALESCE($7, app_metadata), started_at = COALESCE($8, started_at), finished_at = \
             COALESCE($9, finished_at) WHERE id = $10",
            &[
                &next_status.as_str(),
                &error_message,
                &blob_ref.as_ref().map(|b| b.filename.as_str()),
                &blob_ref.as_ref().map(|b| b.key.as_str()),
                &blob_ref.as_ref().map(|b| b.bucket.as_str()),
                &data_object_ids_json,
                &app_metadata_json,
                &started_at,
                &finished_at,
                &id.as_str(),
            ],
        )
        .map_err(|err| StoreError::Io(err.to_string()))?;
        let row = tx
            .query_one("SELECT * FROM verification_tasks WHERE id = $1", &[&id.as_str()])
            .map_err(|err| StoreError::Io(err.to_string()))?;
        tx.commit().map_err(|err| StoreError::Io(err.to_string()))?;
        row_to_task(&row)
    }

    /// Hard-deletes a task row. Refused when the task is `active` (spec.md
    /// §4.6 `deleteTask`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the task does not exist,
    /// [`StoreError::InvalidTransition`] when the task is `active`, or
    /// [`StoreError::Io`] on a database error.
    pub fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let mut tx = conn.transaction().map_err(|err| StoreError::Io(err.to_string()))?;
        let row = tx
            .query_opt("SELECT status FROM verification_tasks WHERE id = $1 FOR UPDATE", &[&id.as_str()])
            .map_err(|err| StoreError::Io(err.to_string()))?
            .ok_or_else(|| StoreError::NotFound(id.as_str().to_string()))?;
        let status: String = row.get(0);
        if status == "active" {
            return Err(StoreError::InvalidTransition("cannot delete an active task".to_string()));
        }
        tx.execute("DELETE FROM verification_tasks WHERE id = $1", &[&id.as_str()])
            .map_err(|err| StoreError::Io(err.to_string()))?;
        tx.commit().map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(())
    }

    /// Fetches one task by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on a database error.
    pub fn get_task(&self, id: &TaskId) -> Result<Option<VerificationTask>, StoreError> {
        let mut conn = self.connection()?;
        let row = conn
            .query_opt("SELECT * FROM verification_tasks WHERE id = $1", &[&id.as_str()])
            .map_err(|err| StoreError::Io(err.to_string()))?;
        row.as_ref().map(row_to_task).transpose()
    }

    /// Lists tasks for one application, newest first, `(created_at, id)`
    /// key-set paginated.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on a database error.
    pub fn list_tasks_for_app(
        &self,
        app_id: &AppId,
        cursor: Option<(Timestamp, TaskId)>,
        limit: i64,
    ) -> Result<Vec<VerificationTask>, StoreError> {
        let mut conn = self.connection()?;
        let rows = if let Some((created_at, id)) = cursor {
            let created_at = created_at.to_rfc3339();
            conn.query(
                "SELECT * FROM verification_tasks WHERE app_id = $1 AND (created_at, id) < ($2, \
                 $3) ORDER BY created_at DESC, id DESC LIMIT $4",
                &[&app_id.as_str(), &created_at, &id.as_str(), &limit],
            )
        } else {
            conn.query(
                "SELECT * FROM verification_tasks WHERE app_id = $1 ORDER BY created_at DESC, id \
                 DESC LIMIT $2",
                &[&app_id.as_str(), &limit],
            )
        }
        .map_err(|err| StoreError::Io(err.to_string()))?;
        rows.iter().map(row_to_task).collect()
    }

    /// Atomically claims the oldest `pending` task and transitions it to
    /// `active`, using `SELECT ... FOR UPDATE SKIP LOCKED` so concurrent
    /// worker fibers never race on the same row (spec.md §9, resolving the
    /// "Redis-backed dispatch" framing onto the Postgres queue-of-record;
    /// see DESIGN.md).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on a database error.
    pub fn claim_next_pending_task(&self) -> Result<Option<VerificationTask>, StoreError> {
        let mut conn = self.connection()?;
        let mut tx = conn.transaction().map_err(|err| StoreError::Io(err.to_string()))?;
        let Some(row) = tx
            .query_opt(
                "SELECT id FROM verification_tasks WHERE status = 'pending' ORDER BY created_at \
                 ASC, id ASC FOR UPDATE SKIP LOCKED LIMIT 1",
                &[],
            )
            .map_err(|err| StoreError::Io(err.to_string()))?
        else {
            tx.commit().map_err(|err| StoreError::Io(err.to_string()))?;
            return Ok(None);
        };
        let id: String = row.get(0);
        let now = Timestamp::now().to_rfc3339();
        let row = tx
            .query_one(
                "UPDATE verification_tasks SET status = 'active', started_at = $1 WHERE id = $2 \
                 RETURNING *",
                &[&now, &id],
            )
            .map_err(|err| StoreError::Io(err.to_string()))?;
        tx.commit().map_err(|err| StoreError::Io(err.to_string()))?;
        row_to_task(&row).map(Some)
    }

    /// Flips every `active` task whose `started_at` predates `now - grace`
    /// to `failed` with `errorMessage = "deadline exceeded"` (spec.md §5,
    /// the reaper cron that recovers from a worker restart mid-run).
    /// Returns the number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on a database error.
    pub fn reap_stale_active_tasks(&self, grace: time::Duration) -> Result<u64, StoreError> {
        let mut conn = self.connection()?;
        let cutoff = (time::OffsetDateTime::now_utc() - grace)
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        let now = Timestamp::now().to_rfc3339();
        let affected = conn
            .execute(
                "UPDATE verification_tasks SET status = 'failed', error_message = 'deadline \
                 exceeded', finished_at = $1 WHERE status = 'active' AND started_at < $2",
                &[&now, &cutoff],
            )
            .map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(affected)
    }
}
