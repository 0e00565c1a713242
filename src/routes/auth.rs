use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::auth::{password, session};
use crate::db;
use crate::error::AppError;
use crate::models::PublicUser;
use crate::routes::forms::{self, FormDescription};
use crate::state::SharedState;
use crate::validate;

const BAD_CREDENTIALS: &str = "Email or password incorrect, please try again.";
const INACTIVE_ACCOUNT: &str = "Your account is not active.";
const DUPLICATE_EMAIL: &str = "A user with this email already exists.";
const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

#[derive(Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub redirect_to: String,
}

pub async fn signup_form() -> Json<FormDescription> {
    Json(forms::signup())
}

/// Create an account and log it in.
pub async fn signup(
    State(state): State<SharedState>,
    Json(req): Json<SignupRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let username = validate::username(&req.username)?;
    let email = validate::email(&req.email)?;
    if req.password.is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }

    if db::users::email_taken(&state.pool, &email).await? {
        return Err(AppError::DuplicateEmail(DUPLICATE_EMAIL.to_string()));
    }

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    // The pre-check above races with concurrent signups; the unique indexes decide.
    let user = db::users::create(&state.pool, &username, &email, &pw_hash)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e, db::users::EMAIL_KEY) {
                AppError::DuplicateEmail(DUPLICATE_EMAIL.to_string())
            } else if db::is_unique_violation(&e, db::users::USERNAME_KEY) {
                AppError::Validation(DUPLICATE_USERNAME.to_string())
            } else {
                AppError::Database(e)
            }
        })?;

    let jar = session::start(&state.pool, &state.config, &user).await?;
    tracing::info!(user_id = %user.id, "User signed up");

    Ok((
        jar,
        Json(AuthResponse {
            user: PublicUser::from(&user),
            redirect_to: "/".to_string(),
        }),
    ))
}

/// Logged-in users are sent home instead of seeing the form again.
pub async fn login_form(auth: Option<AuthUser>) -> Response {
    if auth.is_some() {
        return Redirect::to("/").into_response();
    }
    Json(forms::login()).into_response()
}

pub async fn login(
    State(state): State<SharedState>,
    Query(query): Query<LoginQuery>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let email = validate::required("email", &req.email)?.to_lowercase();
    if req.password.is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }

    if let Err(retry_after) = state.login_limiter.check(&email) {
        return Err(AppError::RateLimited(format!(
            "Too many login attempts. Try again in {retry_after} seconds."
        )));
    }

    let Some(user) = db::users::find_by_email(&state.pool, &email).await? else {
        state.login_limiter.record_failure(&email);
        return Err(AppError::InvalidCredentials(BAD_CREDENTIALS.to_string()));
    };

    if !user.is_active {
        return Err(AppError::InvalidCredentials(INACTIVE_ACCOUNT.to_string()));
    }

    let valid = password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record_failure(&email);
        tracing::info!(user_id = %user.id, "Failed login");
        return Err(AppError::InvalidCredentials(BAD_CREDENTIALS.to_string()));
    }

    state.login_limiter.record_success(&email);
    let jar = session::start(&state.pool, &state.config, &user).await?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        jar,
        Json(AuthResponse {
            user: PublicUser::from(&user),
            redirect_to: local_redirect(query.next.as_deref()),
        }),
    ))
}

/// Ends the session unconditionally.
pub async fn logout(
    auth: AuthUser,
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let cleared = session::end(&state.pool, &jar).await?;
    tracing::info!(user_id = %auth.user_id, "User logged out");
    Ok((cleared, Redirect::to("/login")))
}

/// Only same-site absolute paths are honored as `next`.
fn local_redirect(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}
