/// Task resource endpoints
///
/// Standard CRUD over tasks plus the two custom operations: replacing a
/// task's assigned-user set and listing the tasks assigned to a user.
/// Every operation requires an authenticated caller; no ownership check
/// ties the caller to the task being read or modified.
///
/// # Endpoints
///
/// - `GET    /v1/tasks`               - List tasks, newest first
/// - `POST   /v1/tasks`               - Create (creator = caller)
/// - `GET    /v1/tasks/:id`           - Retrieve with nested user details
/// - `PUT    /v1/tasks/:id`           - Full update of the core fields
/// - `PATCH  /v1/tasks/:id`           - Partial update
/// - `DELETE /v1/tasks/:id`           - Delete
/// - `POST   /v1/tasks/:id/assign`    - Replace the assigned-user set
/// - `GET    /v1/tasks/user_tasks`    - Tasks assigned to ?user_id

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tasktrack_shared::{
    auth::middleware::AuthContext,
    models::{
        task::{CreateTask, Task, TaskStatus, TaskType, UpdateTask},
        user::User,
    },
};
use validator::Validate;

use super::users::UserResponse;

/// Default page size for listings
const DEFAULT_LIMIT: i64 = 100;

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Maximum number of rows to return
    pub limit: Option<i64>,

    /// Number of rows to skip
    pub offset: Option<i64>,
}

/// Create task request
///
/// Intentionally excludes assignment and creator fields: the creator is
/// the authenticated caller and the assigned set starts empty.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task name
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    /// Description
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,

    /// Task category
    pub task_type: TaskType,

    /// Initial status (defaults to PENDING)
    #[serde(default)]
    pub status: TaskStatus,
}

/// Full update request (PUT)
#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceTaskRequest {
    /// Task name
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    /// Description
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,

    /// Task category
    pub task_type: TaskType,

    /// Status; left unchanged when omitted
    pub status: Option<TaskStatus>,
}

/// Partial update request (PATCH)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New name
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    /// New description
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    /// New task category
    pub task_type: Option<TaskType>,

    /// New status (any transition accepted)
    pub status: Option<TaskStatus>,
}

/// Assignment request
#[derive(Debug, Deserialize, Validate)]
pub struct AssignRequest {
    /// IDs of the users to assign; replaces the whole set
    #[validate(length(min = 1, message = "user_ids must not be empty"))]
    pub user_ids: Vec<i64>,
}

/// Query parameters for the per-user task lookup
#[derive(Debug, Deserialize)]
pub struct UserTasksQuery {
    /// User whose assigned tasks to list
    pub user_id: Option<i64>,
}

/// Full task representation with nested user details
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// Task ID
    pub id: i64,

    /// Task name
    pub name: String,

    /// Description
    pub description: String,

    /// Task category
    pub task_type: TaskType,

    /// Current status
    pub status: TaskStatus,

    /// Users currently assigned to the task
    pub assigned_to: Vec<UserResponse>,

    /// User who created the task
    pub created_by: UserResponse,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// Completion timestamp (never populated by any operation)
    pub completed_at: Option<DateTime<Utc>>,
}

/// Creation response: identity and core fields only
///
/// Deliberately omits assigned_to and created_by.
#[derive(Debug, Serialize)]
pub struct TaskCreatedResponse {
    /// Task ID
    pub id: i64,

    /// Task name
    pub name: String,

    /// Description
    pub description: String,

    /// Task category
    pub task_type: TaskType,

    /// Current status
    pub status: TaskStatus,
}

impl From<Task> for TaskCreatedResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            name: task.name,
            description: task.description,
            task_type: task.task_type,
            status: task.status,
        }
    }
}

/// Resolves a task's creator and assignees into the full representation
async fn task_response(db: &PgPool, task: Task) -> ApiResult<TaskResponse> {
    let creator = User::find_by_id(db, task.created_by)
        .await?
        .ok_or_else(|| ApiError::InternalError("Task creator no longer exists".to_string()))?;

    let assignees = Task::assignees(db, task.id).await?;

    Ok(TaskResponse {
        id: task.id,
        name: task.name,
        description: task.description,
        task_type: task.task_type,
        status: task.status,
        assigned_to: assignees.into_iter().map(UserResponse::from).collect(),
        created_by: creator.into(),
        created_at: task.created_at,
        updated_at: task.updated_at,
        completed_at: task.completed_at,
    })
}

/// Lists tasks, newest first
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = Task::list(
        &state.db,
        query.limit.unwrap_or(DEFAULT_LIMIT),
        query.offset.unwrap_or(0),
    )
    .await?;

    let mut responses = Vec::with_capacity(tasks.len());
    for task in tasks {
        responses.push(task_response(&state.db, task).await?);
    }

    Ok(Json(responses))
}

/// Creates a task
///
/// The creator is fixed to the authenticated caller and the assigned set
/// starts empty.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskCreatedResponse>)> {
    req.validate()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            name: req.name,
            description: req.description,
            task_type: req.task_type,
            status: req.status,
            created_by: auth.user_id,
        },
    )
    .await?;

    tracing::info!(
        task_id = task.id,
        created_by = auth.user_id,
        task_type = task.task_type.as_str(),
        "Task created"
    );

    Ok((StatusCode::CREATED, Json(task.into())))
}

/// Retrieves a single task with nested user details
///
/// # Errors
///
/// - `404 Not Found`: No task with this ID
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task_response(&state.db, task).await?))
}

/// Full update (PUT) of the mutable core fields
///
/// The creator, timestamps, and assigned set are not writable here.
///
/// # Errors
///
/// - `404 Not Found`: No task with this ID
/// - `422 Unprocessable Entity`: Validation failed
pub async fn replace_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ReplaceTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate()?;

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            name: Some(req.name),
            description: Some(req.description),
            task_type: Some(req.task_type),
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task_response(&state.db, task).await?))
}

/// Partial update (PATCH)
///
/// Only the provided fields are changed. Status values are accepted
/// as-is; no transition rules apply.
///
/// # Errors
///
/// - `404 Not Found`: No task with this ID
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate()?;

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            name: req.name,
            description: req.description,
            task_type: req.task_type,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task_response(&state.db, task).await?))
}

/// Deletes a task
///
/// # Errors
///
/// - `404 Not Found`: No task with this ID
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = Task::delete(&state.db, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(task_id = id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Replaces the task's assigned-user set
///
/// Every requested ID must reference an existing user; otherwise the
/// request fails and the current set is left untouched. Matched rows are
/// compared against the requested list length, so duplicate IDs in the
/// input also trip the error. On success the set is replaced wholesale
/// (not merged) and the full task representation is returned.
///
/// # Errors
///
/// - `400 Bad Request`: One or more user IDs matched no user
/// - `404 Not Found`: No task with this ID
/// - `422 Unprocessable Entity`: Empty or malformed user_ids list
pub async fn assign_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate()?;

    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let users = User::find_by_ids(&state.db, &req.user_ids).await?;

    if users.len() != req.user_ids.len() {
        return Err(ApiError::BadRequest("Some users were not found".to_string()));
    }

    Task::replace_assignees(&state.db, task.id, &req.user_ids).await?;

    tracing::info!(
        task_id = task.id,
        assignees = req.user_ids.len(),
        "Task assignees replaced"
    );

    Ok(Json(task_response(&state.db, task).await?))
}

/// Lists the tasks assigned to a given user, newest first
///
/// # Errors
///
/// - `400 Bad Request`: Missing user_id parameter
/// - `404 Not Found`: No user with this ID
pub async fn user_tasks(
    State(state): State<AppState>,
    Query(query): Query<UserTasksQuery>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let user_id = query
        .user_id
        .ok_or_else(|| ApiError::BadRequest("user_id parameter is required".to_string()))?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let tasks = Task::list_assigned_to(&state.db, user.id).await?;

    let mut responses = Vec::with_capacity(tasks.len());
    for task in tasks {
        responses.push(task_response(&state.db, task).await?);
    }

    Ok(Json(responses))
}
