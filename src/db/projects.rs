use std::sync::LazyLock;

use sqlx::PgPool;
use uuid::Uuid;

use crate::access::{PROJECT_OWNER_SQL, PROJECT_VISIBLE_SQL};
use crate::models::Project;

static LIST_VISIBLE: LazyLock<String> = LazyLock::new(|| {
    format!(
        "SELECT p.* FROM projects p WHERE {PROJECT_VISIBLE_SQL}
         ORDER BY p.created_at DESC, p.id"
    )
});

static FIND_VISIBLE: LazyLock<String> = LazyLock::new(|| {
    format!("SELECT p.* FROM projects p WHERE p.id = $2 AND {PROJECT_VISIBLE_SQL}")
});

static FIND_OWNED: LazyLock<String> = LazyLock::new(|| {
    format!("SELECT p.* FROM projects p WHERE p.id = $2 AND {PROJECT_OWNER_SQL}")
});

static UPDATE_OWNED: LazyLock<String> = LazyLock::new(|| {
    format!(
        "UPDATE projects AS p SET name = $3, description = $4, updated_at = now()
         WHERE p.id = $2 AND {PROJECT_OWNER_SQL} RETURNING p.*"
    )
});

static DELETE_OWNED: LazyLock<String> = LazyLock::new(|| {
    format!("DELETE FROM projects AS p WHERE p.id = $2 AND {PROJECT_OWNER_SQL}")
});

pub async fn create(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
    description: &str,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "INSERT INTO projects (owner_id, name, description) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(owner_id)
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

/// Projects the user owns or holds an assignment in, each listed once.
pub async fn list_visible(pool: &PgPool, user_id: Uuid) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(LIST_VISIBLE.as_str())
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn find_visible(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(FIND_VISIBLE.as_str())
        .bind(user_id)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// `None` both when the project is missing and when `owner_id` does not own it.
pub async fn find_owned_by(
    pool: &PgPool,
    id: Uuid,
    owner_id: Uuid,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(FIND_OWNED.as_str())
        .bind(owner_id)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update_owned(
    pool: &PgPool,
    id: Uuid,
    owner_id: Uuid,
    name: &str,
    description: &str,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(UPDATE_OWNED.as_str())
        .bind(owner_id)
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(pool)
        .await
}

/// Tasks go with the project. Returns whether a row was deleted.
pub async fn delete_owned(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(DELETE_OWNED.as_str())
        .bind(owner_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
