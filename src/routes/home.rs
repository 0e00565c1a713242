use axum::Json;
use serde::Serialize;

use crate::auth::extractor::AuthUser;
use crate::models::PublicUser;

#[derive(Serialize)]
pub struct Landing {
    pub user: Option<PublicUser>,
}

pub async fn index(auth: Option<AuthUser>) -> Json<Landing> {
    Json(Landing {
        user: auth.map(|a| PublicUser {
            id: a.user_id,
            username: a.username,
        }),
    })
}

pub async fn health() -> &'static str {
    "ok"
}
