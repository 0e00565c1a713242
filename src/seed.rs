use sqlx::PgPool;

use crate::auth::password;
use crate::config::SeedUser;
use crate::db;
use crate::error::AppError;
use crate::validate;

/// Create the configured account unless a user with that username exists.
/// Returns whether a user was created.
pub async fn ensure_user(pool: &PgPool, seed: &SeedUser) -> Result<bool, AppError> {
    let username = validate::username(&seed.username)?;
    let email = validate::email(&seed.email)?;

    if db::users::find_by_username(pool, &username).await?.is_some() {
        tracing::info!("Seed user '{username}' already exists");
        return Ok(false);
    }
    if db::users::email_taken(pool, &email).await? {
        return Err(AppError::DuplicateEmail(format!(
            "Seed email {email} belongs to another user"
        )));
    }

    let pw_hash = password::hash(&seed.password).map_err(AppError::Internal)?;
    let user = db::users::create(pool, &username, &email, &pw_hash).await?;
    tracing::info!(user_id = %user.id, "Seed user '{username}' created");
    Ok(true)
}
