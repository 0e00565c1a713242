use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::session;
use crate::error::AppError;
use crate::state::SharedState;

/// The authenticated requester, resolved from the session cookie once per request
/// and handed to handlers explicitly.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}

async fn lookup(parts: &Parts, state: &SharedState) -> Result<Option<AuthUser>, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let user = session::resolve(&state.pool, &jar).await?;
    Ok(user.map(|u| AuthUser {
        user_id: u.id,
        username: u.username,
    }))
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        lookup(parts, state)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

impl OptionalFromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Option<Self>, Self::Rejection> {
        lookup(parts, state).await
    }
}
