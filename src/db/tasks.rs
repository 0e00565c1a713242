use std::sync::LazyLock;

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::access::{PROJECT_OWNER_SQL, TASK_STATUS_AUTHORITY_SQL, TASK_VISIBLE_SQL};
use crate::models::{Task, TaskStatus};

/// The user-editable columns of a task, already validated.
#[derive(Debug, Clone)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub assigned_to: Option<Uuid>,
}

static CREATE_IN_OWNED: LazyLock<String> = LazyLock::new(|| {
    format!(
        "INSERT INTO tasks (project_id, title, description, due_date, status, assigned_to)
         SELECT p.id, $3, $4, $5, $6, $7 FROM projects p
         WHERE p.id = $2 AND {PROJECT_OWNER_SQL}
         RETURNING *"
    )
});

static LIST_VISIBLE: LazyLock<String> = LazyLock::new(|| {
    format!(
        "SELECT t.* FROM tasks t JOIN projects p ON p.id = t.project_id
         WHERE t.project_id = $2 AND {TASK_VISIBLE_SQL}
           AND ($3::task_status IS NULL OR t.status = $3)
         ORDER BY t.created_at, t.id"
    )
});

static FIND_VISIBLE: LazyLock<String> = LazyLock::new(|| {
    format!(
        "SELECT t.* FROM tasks t JOIN projects p ON p.id = t.project_id
         WHERE t.project_id = $2 AND t.id = $3 AND {TASK_VISIBLE_SQL}"
    )
});

static FIND_OWNED: LazyLock<String> = LazyLock::new(|| {
    format!(
        "SELECT t.* FROM tasks t JOIN projects p ON p.id = t.project_id
         WHERE t.project_id = $2 AND t.id = $3 AND {PROJECT_OWNER_SQL}"
    )
});

static UPDATE_OWNED: LazyLock<String> = LazyLock::new(|| {
    format!(
        "UPDATE tasks AS t
         SET title = $4, description = $5, due_date = $6, status = $7, assigned_to = $8,
             updated_at = now()
         FROM projects p
         WHERE p.id = t.project_id AND t.project_id = $2 AND t.id = $3 AND {PROJECT_OWNER_SQL}
         RETURNING t.*"
    )
});

static DELETE_OWNED: LazyLock<String> = LazyLock::new(|| {
    format!(
        "DELETE FROM tasks AS t USING projects p
         WHERE p.id = t.project_id AND t.project_id = $2 AND t.id = $3 AND {PROJECT_OWNER_SQL}"
    )
});

static SET_STATUS: LazyLock<String> = LazyLock::new(|| {
    format!(
        "UPDATE tasks AS t SET status = $4, updated_at = now()
         FROM projects p
         WHERE p.id = t.project_id AND t.project_id = $2 AND t.id = $3
           AND {TASK_STATUS_AUTHORITY_SQL}
         RETURNING t.*"
    )
});

static FIND_STATUS_AUTHORITY: LazyLock<String> = LazyLock::new(|| {
    format!(
        "SELECT t.* FROM tasks t JOIN projects p ON p.id = t.project_id
         WHERE t.project_id = $2 AND t.id = $3 AND {TASK_STATUS_AUTHORITY_SQL}"
    )
});

/// Inserts only when `owner_id` owns `project_id`; `None` otherwise.
pub async fn create_in_owned_project(
    pool: &PgPool,
    owner_id: Uuid,
    project_id: Uuid,
    fields: &TaskFields,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(CREATE_IN_OWNED.as_str())
        .bind(owner_id)
        .bind(project_id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.due_date)
        .bind(fields.status)
        .bind(fields.assigned_to)
        .fetch_optional(pool)
        .await
}

pub async fn list_visible(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Uuid,
    status: Option<TaskStatus>,
) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(LIST_VISIBLE.as_str())
        .bind(user_id)
        .bind(project_id)
        .bind(status)
        .fetch_all(pool)
        .await
}

pub async fn find_visible(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Uuid,
    task_id: Uuid,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(FIND_VISIBLE.as_str())
        .bind(user_id)
        .bind(project_id)
        .bind(task_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_owned_by(
    pool: &PgPool,
    owner_id: Uuid,
    project_id: Uuid,
    task_id: Uuid,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(FIND_OWNED.as_str())
        .bind(owner_id)
        .bind(project_id)
        .bind(task_id)
        .fetch_optional(pool)
        .await
}

pub async fn update_owned(
    pool: &PgPool,
    owner_id: Uuid,
    project_id: Uuid,
    task_id: Uuid,
    fields: &TaskFields,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(UPDATE_OWNED.as_str())
        .bind(owner_id)
        .bind(project_id)
        .bind(task_id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.due_date)
        .bind(fields.status)
        .bind(fields.assigned_to)
        .fetch_optional(pool)
        .await
}

pub async fn delete_owned(
    pool: &PgPool,
    owner_id: Uuid,
    project_id: Uuid,
    task_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(DELETE_OWNED.as_str())
        .bind(owner_id)
        .bind(project_id)
        .bind(task_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Owner or assignee only. `None` when the task is missing or out of reach.
pub async fn set_status(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Uuid,
    task_id: Uuid,
    status: TaskStatus,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(SET_STATUS.as_str())
        .bind(user_id)
        .bind(project_id)
        .bind(task_id)
        .bind(status)
        .fetch_optional(pool)
        .await
}

/// The task if `user_id` could change its status, without changing anything.
pub async fn find_with_status_authority(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Uuid,
    task_id: Uuid,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(FIND_STATUS_AUTHORITY.as_str())
        .bind(user_id)
        .bind(project_id)
        .bind(task_id)
        .fetch_optional(pool)
        .await
}
