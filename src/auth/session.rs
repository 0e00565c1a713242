use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::config::Config;
use crate::db;
use crate::error::AppError;
use crate::models::User;

pub const COOKIE_NAME: &str = "webtask_session";

/// 32 random bytes, hex encoded. Only its hash is stored.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(config.session_ttl_hours))
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

/// Persist a new session for `user` and return the jar that carries its cookie.
pub async fn start(pool: &PgPool, config: &Config, user: &User) -> Result<CookieJar, AppError> {
    let purged = db::sessions::delete_expired_for_user(pool, user.id).await?;
    if purged > 0 {
        tracing::debug!(user_id = %user.id, purged, "Purged expired sessions");
    }

    let token = generate_token();
    let expires_at = Utc::now() + Duration::hours(config.session_ttl_hours);
    db::sessions::create(pool, user.id, &hash_token(&token), expires_at).await?;

    Ok(CookieJar::new().add(session_cookie(token, config)))
}

/// The user behind the session cookie in `jar`, if it names a live session.
pub async fn resolve(pool: &PgPool, jar: &CookieJar) -> Result<Option<User>, AppError> {
    let Some(cookie) = jar.get(COOKIE_NAME) else {
        return Ok(None);
    };
    if cookie.value().is_empty() {
        return Ok(None);
    }
    Ok(db::sessions::find_user_by_hash(pool, &hash_token(cookie.value())).await?)
}

/// Drop the server-side session (if any) and return a jar that clears the cookie.
pub async fn end(pool: &PgPool, jar: &CookieJar) -> Result<CookieJar, AppError> {
    if let Some(cookie) = jar.get(COOKIE_NAME) {
        db::sessions::delete_by_hash(pool, &hash_token(cookie.value())).await?;
    }
    Ok(CookieJar::new().add(removal_cookie()))
}
