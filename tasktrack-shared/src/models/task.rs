/// Task model and database operations
///
/// This module provides the Task model, its enumerated type/status, and
/// the assigned-user set (a many-to-many relation to users).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_type AS ENUM ('FEATURE', 'BUG', 'DOCUMENTATION', 'MAINTENANCE');
/// CREATE TYPE task_status AS ENUM ('PENDING', 'IN_PROGRESS', 'COMPLETED', 'CANCELLED');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL,
///     task_type task_type NOT NULL,
///     status task_status NOT NULL DEFAULT 'PENDING',
///     created_by BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     completed_at TIMESTAMPTZ
/// );
///
/// CREATE TABLE task_assignees (
///     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (task_id, user_id)
/// );
/// ```
///
/// Status transitions are deliberately unrestricted: any status value may
/// replace any other through the update operation, including backward
/// moves such as COMPLETED back to PENDING.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::user::User;

const TASK_COLUMNS: &str = "id, name, description, task_type, status, created_by, \
                            created_at, updated_at, completed_at";

/// Task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// New functionality
    Feature,

    /// Defect fix
    Bug,

    /// Documentation work
    Documentation,

    /// Upkeep with no user-visible change
    Maintenance,
}

impl TaskType {
    /// Converts the type to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Feature => "FEATURE",
            TaskType::Bug => "BUG",
            TaskType::Documentation => "DOCUMENTATION",
            TaskType::Maintenance => "MAINTENANCE",
        }
    }
}

/// Task workflow status
///
/// No transition rules are enforced on updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started yet (the default on creation)
    Pending,

    /// Being worked on
    InProgress,

    /// Finished
    Completed,

    /// Abandoned
    Cancelled,
}

impl TaskStatus {
    /// Converts the status to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Human-readable task name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Task category
    pub task_type: TaskType,

    /// Current workflow status
    pub status: TaskStatus,

    /// User who created the task; fixed at creation, never updated
    pub created_by: i64,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// Completion timestamp; nullable, not populated by any operation
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task name
    pub name: String,

    /// Description
    pub description: String,

    /// Task category
    pub task_type: TaskType,

    /// Initial status (defaults to pending)
    #[serde(default)]
    pub status: TaskStatus,

    /// Creating user (the authenticated caller)
    pub created_by: i64,
}

/// Input for updating a task's mutable core fields
///
/// Only non-None fields are written. The creator, timestamps, and the
/// assigned set are not reachable from here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New task category
    pub task_type: Option<TaskType>,

    /// New status (any transition accepted)
    pub status: Option<TaskStatus>,
}

impl Task {
    /// Creates a new task with an empty assigned set
    ///
    /// # Errors
    ///
    /// Returns an error if `created_by` references no existing user or
    /// the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (name, description, task_type, status, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.task_type)
        .bind(data.status)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Updates a task's mutable core fields
    ///
    /// Only non-None fields in `data` are written; `updated_at` is set to
    /// the current time. Status values are written as-is, with no
    /// transition validation.
    ///
    /// # Returns
    ///
    /// The updated task, or None if no task with `id` exists
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${bind_count}"));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${bind_count}"));
        }
        if data.task_type.is_some() {
            bind_count += 1;
            query.push_str(&format!(", task_type = ${bind_count}"));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${bind_count}"));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(task_type) = data.task_type {
            q = q.bind(task_type);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task by ID
    ///
    /// Assignment rows are removed by cascade.
    ///
    /// # Returns
    ///
    /// True if a task was deleted, false if none existed
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists tasks with pagination, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists every task whose assigned set contains `user_id`, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_assigned_to(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT t.id, t.name, t.description, t.task_type, t.status, t.created_by,
                   t.created_at, t.updated_at, t.completed_at
            FROM tasks t
            INNER JOIN task_assignees ta ON ta.task_id = t.id
            WHERE ta.user_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Returns the users currently assigned to a task
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn assignees(pool: &PgPool, task_id: i64) -> Result<Vec<User>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.password_hash, u.email, u.mobile, u.is_active,
                   u.is_staff, u.created_at, u.updated_at, u.last_login
            FROM users u
            INNER JOIN task_assignees ta ON ta.user_id = u.id
            WHERE ta.task_id = $1
            ORDER BY u.id
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Replaces the task's entire assigned set with `user_ids`
    ///
    /// The replace is atomic: the old rows are deleted and the new ones
    /// inserted in a single transaction. Callers must have verified that
    /// every ID references an existing user; a dangling ID fails the
    /// transaction on the foreign key and leaves the old set in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn replace_assignees(
        pool: &PgPool,
        task_id: i64,
        user_ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM task_assignees WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO task_assignees (task_id, user_id)
            SELECT $1, user_id FROM UNNEST($2::BIGINT[]) AS user_id
            "#,
        )
        .bind(task_id)
        .bind(user_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }
}
