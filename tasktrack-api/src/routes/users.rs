/// User resource endpoints
///
/// Standard CRUD over user accounts. Creation is the public signup
/// operation; every other operation requires an authenticated caller. No
/// further authorization scoping is applied: any authenticated user may
/// read, modify, or delete any other user.
///
/// # Endpoints
///
/// - `POST   /v1/users`     - Signup (public)
/// - `GET    /v1/users`     - List users
/// - `GET    /v1/users/:id` - Retrieve a user
/// - `PUT    /v1/users/:id` - Full update
/// - `PATCH  /v1/users/:id` - Partial update
/// - `DELETE /v1/users/:id` - Delete (cascades to created tasks)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasktrack_shared::{
    auth::password,
    models::user::{CreateUser, UpdateUser, User},
};
use validator::Validate;

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

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Username (unique)
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    /// Password (validated for strength before hashing)
    pub password: String,

    /// Optional email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Optional mobile number
    #[validate(length(max = 15, message = "Mobile number must be at most 15 characters"))]
    pub mobile: Option<String>,
}

/// Full update request (PUT)
///
/// Omitted optional fields are cleared, matching replace semantics.
#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceUserRequest {
    /// Username (unique)
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    /// New password; the stored hash is kept when omitted
    pub password: Option<String>,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Mobile number
    #[validate(length(max = 15, message = "Mobile number must be at most 15 characters"))]
    pub mobile: Option<String>,

    /// Active flag
    pub is_active: Option<bool>,
}

/// Partial update request (PATCH)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New username
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: Option<String>,

    /// New password
    pub password: Option<String>,

    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New mobile number
    #[validate(length(max = 15, message = "Mobile number must be at most 15 characters"))]
    pub mobile: Option<String>,

    /// New active flag
    pub is_active: Option<bool>,
}

/// Public user representation (never includes the credential)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID
    pub id: i64,

    /// Username
    pub username: String,

    /// Email address
    pub email: Option<String>,

    /// Mobile number
    pub mobile: Option<String>,

    /// Whether the account may authenticate
    pub is_active: bool,

    /// Staff flag
    pub is_staff: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            mobile: user.mobile,
            is_active: user.is_active,
            is_staff: user.is_staff,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login: user.last_login,
        }
    }
}

/// Signup endpoint (public)
///
/// Creates a new account with a hashed credential.
///
/// # Errors
///
/// - `409 Conflict`: Username already exists
/// - `422 Unprocessable Entity`: Validation failed (including weak password)
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.validate()?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            password_hash,
            email: req.email,
            mobile: req.mobile,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User created");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Lists users, newest first
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = User::list(
        &state.db,
        query.limit.unwrap_or(DEFAULT_LIMIT),
        query.offset.unwrap_or(0),
    )
    .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Retrieves a single user
///
/// # Errors
///
/// - `404 Not Found`: No user with this ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Full update (PUT)
///
/// Replaces the account's editable fields; omitted optional fields are
/// cleared. A provided password is strength-checked and re-hashed.
///
/// # Errors
///
/// - `404 Not Found`: No user with this ID
/// - `409 Conflict`: New username collides with another user
/// - `422 Unprocessable Entity`: Validation failed
pub async fn replace_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ReplaceUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let password_hash = match &req.password {
        Some(new_password) => {
            password::validate_password_strength(new_password).map_err(|e| {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "password".to_string(),
                    message: e,
                }])
            })?;
            Some(password::hash_password(new_password)?)
        }
        None => None,
    };

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            username: Some(req.username),
            password_hash,
            email: Some(req.email),
            mobile: Some(req.mobile),
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Partial update (PATCH)
///
/// Only the provided fields are changed.
///
/// # Errors
///
/// - `404 Not Found`: No user with this ID
/// - `409 Conflict`: New username collides with another user
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let password_hash = match &req.password {
        Some(new_password) => {
            password::validate_password_strength(new_password).map_err(|e| {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "password".to_string(),
                    message: e,
                }])
            })?;
            Some(password::hash_password(new_password)?)
        }
        None => None,
    };

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            username: req.username,
            password_hash,
            email: req.email.map(Some),
            mobile: req.mobile.map(Some),
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Deletes a user
///
/// Tasks created by the user are removed by cascade; tasks where they
/// were only an assignee survive without them.
///
/// # Errors
///
/// - `404 Not Found`: No user with this ID
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = User::delete(&state.db, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
