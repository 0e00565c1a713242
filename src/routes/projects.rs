use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access;
use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::Project;
use crate::routes::forms::{self, FormDescription};
use crate::routes::{IdPath, MessageResponse};
use crate::state::SharedState;
use crate::validate;

#[derive(Deserialize)]
pub struct ProjectForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ProjectForm {
    fn clean(&self) -> Result<(String, String), AppError> {
        let name = validate::required("name", &self.name)?;
        validate::max_chars("name", &name, validate::NAME_MAX)?;
        Ok((name, self.description.trim().to_string()))
    }
}

#[derive(Serialize)]
pub struct ProjectListItem {
    #[serde(flatten)]
    pub project: Project,
    pub is_owner: bool,
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<ProjectListItem>>, AppError> {
    let projects = db::projects::list_visible(&state.pool, auth.user_id).await?;
    let items = projects
        .into_iter()
        .map(|project| ProjectListItem {
            is_owner: access::is_owner(auth.user_id, &project),
            project,
        })
        .collect();
    Ok(Json(items))
}

pub async fn new_form(_auth: AuthUser) -> Json<FormDescription> {
    Json(forms::project())
}

/// The requester becomes the owner; no client-supplied owner is read.
pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<ProjectForm>,
) -> Result<Json<Project>, AppError> {
    let (name, description) = req.clean()?;
    let project = db::projects::create(&state.pool, auth.user_id, &name, &description).await?;
    tracing::info!(project_id = %project.id, user_id = %auth.user_id, "Project created");
    Ok(Json(project))
}

async fn owned(state: &SharedState, id: Uuid, auth: &AuthUser) -> Result<Project, AppError> {
    db::projects::find_owned_by(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
}

/// Prefill for the edit form.
pub async fn edit_form(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(owned(&state, id, &auth).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath(id): IdPath<Uuid>,
    Json(req): Json<ProjectForm>,
) -> Result<Json<Project>, AppError> {
    let (name, description) = req.clean()?;
    let project = db::projects::update_owned(&state.pool, id, auth.user_id, &name, &description)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    tracing::info!(project_id = %project.id, "Project updated");
    Ok(Json(project))
}

/// What is about to be deleted, for a confirmation step.
pub async fn delete_confirm(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(owned(&state, id, &auth).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if !db::projects::delete_owned(&state.pool, id, auth.user_id).await? {
        return Err(AppError::NotFound("Project not found".to_string()));
    }
    tracing::info!(project_id = %id, user_id = %auth.user_id, "Project deleted");
    Ok(Json(MessageResponse::new("Deleted")))
}
