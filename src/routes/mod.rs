pub mod auth;
pub mod forms;
pub mod home;
pub mod projects;
pub mod tasks;

use axum::extract::{FromRequestParts, Path};
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::error::AppError;
use crate::state::SharedState;

/// Path parameters whose parse failures answer 404, like any unknown id.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct IdPath<T>(pub T);

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Routes reachable without a session.
pub fn public_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(home::index))
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/login", get(auth::login_form).post(auth::login))
}

/// Routes whose handlers require `AuthUser`.
pub fn app_routes() -> Router<SharedState> {
    Router::new()
        .route("/logout", get(auth::logout))
        // Projects
        .route("/projects", get(projects::list))
        .route("/projects/new", get(projects::new_form).post(projects::create))
        .route(
            "/projects/{project_id}/edit",
            get(projects::edit_form).post(projects::update),
        )
        .route(
            "/projects/{project_id}/delete",
            get(projects::delete_confirm).post(projects::delete),
        )
        // Tasks
        .route("/projects/{project_id}/tasks", get(tasks::list))
        .route(
            "/projects/{project_id}/tasks/new",
            get(tasks::new_form).post(tasks::create),
        )
        .route(
            "/projects/{project_id}/tasks/{id}/edit",
            get(tasks::edit_form).post(tasks::update),
        )
        .route(
            "/projects/{project_id}/tasks/{id}/delete",
            get(tasks::delete_confirm).post(tasks::delete),
        )
        .route(
            "/projects/{project_id}/tasks/{id}/detail",
            get(tasks::detail),
        )
        .route(
            "/projects/{project_id}/tasks/{id}/status/{new_status}",
            get(tasks::change_status),
        )
}
