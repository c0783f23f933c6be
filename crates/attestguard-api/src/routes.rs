// crates/attestguard-api/src/routes.rs
// ============================================================================
// Module: HTTP Task API Routes
// Description: Route handlers for C10's task commands, query endpoints, and
//              widget/cron surfaces (spec.md §4.10, §6).
// Purpose: Translate HTTP requests into C6/C7/C9 calls and back into JSON.
// Dependencies: axum, attestguard-core, attestguard-queue, attestguard-store,
//              attestguard-sync
// Grounded on: decision-gate-mcp::server's `State(Arc<ServerState>)` +
//              `impl IntoResponse` handler shape.
// ============================================================================

use std::sync::Arc;

use attestguard_core::AppId;
use attestguard_core::TaskId;
use attestguard_core::TaskStatus;
use attestguard_core::VerificationFlags;
use axum::Json;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::error::ApiError;
use crate::state::ApiState;

/// One task-creation input (spec.md §4.10 `createTasks(input | input[])`).
#[derive(Debug, Deserialize)]
struct TaskCreateRequest {
    /// Application the task verifies.
    app_id: String,
    /// Opaque caller-supplied metadata, stored verbatim on the task row.
    metadata: Option<Value>,
    /// Verification-flags override; defaults to [`VerificationFlags::all`].
    flags: Option<VerificationFlags>,
}

/// Either one task-creation input or a batch of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskCreateInput {
    /// A single task.
    One(TaskCreateRequest),
    /// A batch of tasks.
    Many(Vec<TaskCreateRequest>),
}

/// Creates one or many tasks (`POST /tasks`, `POST /tasks/batch`).
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when an input names an application
/// absent from C6, and [`ApiError::Unavailable`]/[`ApiError::NotFound`] on
/// a downstream store/queue failure.
async fn create_tasks(
    State(state): State<Arc<ApiState>>,
    Json(input): Json<TaskCreateInput>,
) -> Result<Response, ApiError> {
    let requests = match input {
        TaskCreateInput::One(request) => vec![request],
        TaskCreateInput::Many(requests) => requests,
    };
    let mut task_ids = Vec::with_capacity(requests.len());
    for request in &requests {
        task_ids.push(create_one_task(&state, request).await?);
    }
    if let [only] = task_ids.as_slice() {
        Ok(Json(json!({ "taskId": only.as_str() })).into_response())
    } else {
        Ok(Json(json!({ "taskIds": task_ids.iter().map(TaskId::as_str).collect::<Vec<_>>() }))
            .into_response())
    }
}

/// Validates and enqueues one task-creation request.
async fn create_one_task(state: &ApiState, request: &TaskCreateRequest) -> Result<TaskId, ApiError> {
    let app_id = AppId::new(request.app_id.clone());
    if state.store.get_app(&app_id)?.is_none() {
        return Err(ApiError::Validation(format!("unknown app id {}", request.app_id)));
    }
    let flags = request.flags.unwrap_or_else(VerificationFlags::all);
    let task_id = state.queue.add_task(&app_id, request.metadata.clone(), flags)?;
    Ok(task_id)
}

/// Cancels a `pending` task (`DELETE /tasks/:id`, spec.md §4.6/§8 invariant 3).
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when the task is `active` or terminal.
async fn delete_task(
    State(state): State<Arc<ApiState>>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.queue.remove_job(&TaskId::new(task_id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Re-enqueues a `failed` task under a fresh id without mutating the
/// original row (`POST /tasks/:id/retry`, spec.md §8 invariant 4).
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when the task does not exist, and
/// [`ApiError::Validation`] when it is not `failed`.
async fn retry_task(
    State(state): State<Arc<ApiState>>,
    Path(task_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let task = state
        .store
        .get_task(&TaskId::new(task_id.clone()))?
        .ok_or_else(|| ApiError::NotFound(format!("task {task_id} not found")))?;
    if task.status != TaskStatus::Failed {
        return Err(ApiError::Validation(format!("task {task_id} is not failed")));
    }
    let app_id = task.app_id.ok_or_else(|| ApiError::Validation("task has no app_id".to_string()))?;
    let new_id = state.queue.add_task(&app_id, task.app_metadata.clone(), task.flags)?;
    Ok(Json(json!({ "taskId": new_id.as_str() })))
}

/// One row of `GET /apps/:id`'s task listing.
#[derive(Debug, Serialize)]
struct TaskSummary {
    /// Task id.
    id: String,
    /// Lifecycle status.
    status: String,
    /// Row creation time, RFC3339.
    created_at: String,
}

/// Lists an application and its recent tasks (`GET /apps/:id`).
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when the application does not exist.
async fn get_app(
    State(state): State<Arc<ApiState>>,
    Path(app_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let app_id = AppId::new(app_id);
    let app = state.store.get_app(&app_id)?.ok_or_else(|| ApiError::NotFound(app_id.to_string()))?;
    let tasks = state
        .store
        .list_tasks_for_app(&app_id, None, 50)?
        .into_iter()
        .map(|task| TaskSummary {
            id: task.id.as_str().to_string(),
            status: task.status.as_str().to_string(),
            created_at: task.created_at.to_rfc3339(),
        })
        .collect::<Vec<_>>();
    Ok(Json(json!({ "app": app, "tasks": tasks })))
}

/// Returns one task and, when present, its uploaded report
/// (`GET /apps/:id/:task_id`).
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when the application or task does not
/// exist or the task does not belong to the application.
async fn get_app_task(
    State(state): State<Arc<ApiState>>,
    Path((app_id, task_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let (task, report) = load_task_and_report(&state, &app_id, &task_id)?;
    Ok(Json(json!({ "task": task, "report": report })))
}

/// Serves the embeddable widget report (`GET /widget/:app_id/:task_id`),
/// with a permissive `frame-ancestors` CSP (spec.md §6 "Public report URL
/// shape": the widget route MUST be embeddable; every other route MUST be
/// restrictive).
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when the application or task does not
/// exist or the task does not belong to the application.
async fn get_widget(
    State(state): State<Arc<ApiState>>,
    Path((app_id, task_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (task, report) = load_task_and_report(&state, &app_id, &task_id)?;
    let mut response = Json(json!({ "task": task, "report": report })).into_response();
    response
        .headers_mut()
        .insert("content-security-policy", axum::http::HeaderValue::from_static("frame-ancestors *"));
    Ok(response)
}

/// Shared lookup for `get_app_task`/`get_widget`: the task must exist and
/// belong to `app_id`; its report is read from the blob store when set.
fn load_task_and_report(
    state: &ApiState,
    app_id: &str,
    task_id: &str,
) -> Result<(attestguard_core::VerificationTask, Option<Value>), ApiError> {
    let task = state
        .store
        .get_task(&TaskId::new(task_id.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("task {task_id} not found")))?;
    if task.app_id.as_ref().map(AppId::as_str) != Some(app_id) {
        return Err(ApiError::NotFound(format!("task {task_id} not found for app {app_id}")));
    }
    let report = task
        .blob_ref
        .as_ref()
        .map(|blob_ref| state.blob.download_json(&blob_ref.key))
        .transpose()
        .map_err(|err| ApiError::Unavailable(err.to_string()))?;
    Ok((task, report))
}

/// Rejects a cron-trigger request whose `Authorization: Bearer <key>`
/// header does not match `CRON_API_KEY` (spec.md §6 "Auth").
fn require_cron_auth(state: &ApiState, headers: &HeaderMap) -> Result<(), ApiError> {
    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if provided != Some(state.cron_api_key.as_str()) {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

/// Triggers one profile-sync tick (`POST /cron/profile-sync`).
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] on a missing/incorrect bearer token,
/// and [`ApiError::Unavailable`] when the sync tick fails.
async fn trigger_profile_sync(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    require_cron_auth(&state, &headers)?;
    state.sync.run_profile_sync_once().map_err(|err| ApiError::Unavailable(err.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Triggers one app-sync tick (`POST /cron/app-sync`).
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] on a missing/incorrect bearer token,
/// and [`ApiError::Unavailable`] when the sync tick fails.
async fn trigger_app_sync(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    require_cron_auth(&state, &headers)?;
    state.sync.run_app_sync_once().map_err(|err| ApiError::Unavailable(err.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Triggers the stale-`active`-task reaper (`POST /cron/reap`, spec.md §5
/// "Cancellation and timeouts").
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] on a missing/incorrect bearer token,
/// and [`ApiError::Unavailable`] when the reaper query fails.
async fn trigger_reap(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    require_cron_auth(&state, &headers)?;
    let reaped = state.queue.reap_stale_tasks()?;
    Ok(Json(json!({ "reaped": reaped })))
}

/// Default, restrictive `frame-ancestors` CSP applied to every route except
/// the widget (spec.md §6 "every other route MUST be restrictive").
async fn apply_default_csp(request: axum::extract::Request, next: axum::middleware::Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .entry("content-security-policy")
        .or_insert_with(|| axum::http::HeaderValue::from_static("frame-ancestors 'none'"));
    response
}

/// Builds the full C10 router over `state`.
#[must_use]
pub fn build_router(state: Arc<ApiState>) -> axum::Router {
    axum::Router::new()
        .route("/tasks", axum::routing::post(create_tasks))
        .route("/tasks/batch", axum::routing::post(create_tasks))
        .route("/tasks/{id}", axum::routing::delete(delete_task))
        .route("/tasks/{id}/retry", axum::routing::post(retry_task))
        .route("/apps/{id}", axum::routing::get(get_app))
        .route("/apps/{id}/{task_id}", axum::routing::get(get_app_task))
        .route("/widget/{app_id}/{task_id}", axum::routing::get(get_widget))
        .route("/cron/profile-sync", axum::routing::post(trigger_profile_sync))
        .route("/cron/app-sync", axum::routing::post(trigger_app_sync))
        .route("/cron/reap", axum::routing::post(trigger_reap))
        .layer(axum::middleware::from_fn(apply_default_csp))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test-only payload construction")]

    use super::TaskCreateInput;

    #[test]
    fn single_object_deserializes_as_one() {
        let input: TaskCreateInput = serde_json::from_str(r#"{"app_id": "app-1"}"#).unwrap();
        assert!(matches!(input, TaskCreateInput::One(_)));
    }

    #[test]
    fn array_deserializes_as_many() {
        let input: TaskCreateInput =
            serde_json::from_str(r#"[{"app_id": "app-1"}, {"app_id": "app-2"}]"#).unwrap();
        match input {
            TaskCreateInput::Many(requests) => assert_eq!(requests.len(), 2),
            TaskCreateInput::One(_) => unreachable!("array must deserialize as Many"),
        }
    }

    #[test]
    fn empty_array_deserializes_as_many_with_no_tasks() {
        let input: TaskCreateInput = serde_json::from_str("[]").unwrap();
        match input {
            TaskCreateInput::Many(requests) => assert!(requests.is_empty()),
            TaskCreateInput::One(_) => unreachable!("empty array must deserialize as Many"),
        }
    }
}
