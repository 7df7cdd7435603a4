/// Task endpoints
///
/// All five operations require authentication and are scoped to the
/// caller: creation stamps the caller as owner no matter what the body
/// says, and get/update/delete match on `id AND owner_id`, so another
/// user's task answers exactly like a missing one (404).
///
/// # Endpoints
///
/// - `POST /tasks` - Create a task (201)
/// - `GET /tasks` - List own tasks (`completed`, `sortBy`, `limit`, `skip`)
/// - `GET /tasks/:id` - Fetch one of own tasks
/// - `PATCH /tasks/:id` - Update one of own tasks (whitelisted fields)
/// - `DELETE /tasks/:id` - Delete one of own tasks

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::AuthSession,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use taskdeck_shared::models::task::{CreateTask, Task, TaskListOptions, TaskSort, UpdateTask};
use uuid::Uuid;

/// Fields a task PATCH may touch
const ALLOWED_TASK_UPDATES: &[&str] = &["description", "completed"];

/// Create task request
///
/// Unknown fields (including any attempt to set an owner) are silently
/// dropped by deserialization; the owner is always the caller.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// What needs doing
    pub description: String,

    /// Initial completion state
    #[serde(default)]
    pub completed: bool,
}

/// Query string accepted by the task listing
///
/// Non-numeric `limit`/`skip` values fail deserialization and come back
/// as 400 before the handler runs.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListTasksQuery {
    /// Keep only tasks with this completion state
    pub completed: Option<bool>,

    /// `field:direction` sort expression
    pub sort_by: Option<String>,

    /// Maximum number of tasks to return
    pub limit: Option<i64>,

    /// Number of tasks to skip
    pub skip: Option<i64>,
}

/// Create a task owned by the caller
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let description = req.description.trim().to_string();
    if description.is_empty() {
        return Err(ApiError::invalid_field(
            "description",
            "Description is required",
        ));
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            owner_id: auth.user.id,
            description,
            completed: req.completed,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List the caller's tasks
///
/// Supports `completed=true|false`, `sortBy=field:direction` over the
/// sortable columns, and `limit`/`skip` pagination. Zero matches is an
/// empty array, not an error.
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    if query.limit.is_some_and(|limit| limit < 0) {
        return Err(ApiError::invalid_field(
            "limit",
            "Limit must be non-negative",
        ));
    }
    if query.skip.is_some_and(|skip| skip < 0) {
        return Err(ApiError::invalid_field("skip", "Skip must be non-negative"));
    }

    let sort = match &query.sort_by {
        Some(expr) => {
            TaskSort::parse(expr).map_err(|msg| ApiError::invalid_field("sortBy", &msg))?
        }
        None => TaskSort::default(),
    };

    let tasks = Task::list_for_owner(
        &state.db,
        auth.user.id,
        &TaskListOptions {
            completed: query.completed,
            sort,
            limit: query.limit,
            skip: query.skip,
        },
    )
    .await?;

    Ok(Json(tasks))
}

/// Fetch one of the caller's tasks
pub async fn read_task(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_for_owner(&state.db, id, auth.user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Update one of the caller's tasks
///
/// The body is inspected as raw JSON; naming any field outside the
/// whitelist (description, completed) rejects the whole request with 400
/// and nothing is written.
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
    Json(body): Json<serde_json::Map<String, Value>>,
) -> ApiResult<Json<Task>> {
    if let Some(key) = body
        .keys()
        .find(|key| !ALLOWED_TASK_UPDATES.contains(&key.as_str()))
    {
        return Err(ApiError::BadRequest(format!(
            "Invalid updates: '{key}' cannot be updated"
        )));
    }

    let mut update = UpdateTask::default();

    if let Some(value) = body.get("description") {
        let description = value
            .as_str()
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .ok_or_else(|| {
                ApiError::invalid_field("description", "Description must be a non-empty string")
            })?;
        update.description = Some(description.to_string());
    }

    if let Some(value) = body.get("completed") {
        let completed = value
            .as_bool()
            .ok_or_else(|| ApiError::invalid_field("completed", "Completed must be a boolean"))?;
        update.completed = Some(completed);
    }

    let task = Task::update_for_owner(&state.db, id, auth.user.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Delete one of the caller's tasks, returning the deleted record
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::delete_for_owner(&state.db, id, auth.user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}
