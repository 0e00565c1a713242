use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::TaskPermissions;
use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::tasks::TaskFields;
use crate::error::AppError;
use crate::models::{Project, PublicUser, Task, TaskStatus};
use crate::routes::forms::{self, FormDescription, StatusChoice};
use crate::routes::{IdPath, MessageResponse};
use crate::state::SharedState;
use crate::validate;

#[derive(Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub assigned_to: Option<String>,
}

impl TaskForm {
    /// Unlike the status-change link, the form rejects an unknown status.
    fn clean(&self) -> Result<TaskFields, AppError> {
        let title = validate::required("title", &self.title)?;
        validate::max_chars("title", &title, validate::NAME_MAX)?;

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => TaskStatus::default(),
            Some(raw) => TaskStatus::parse(raw).ok_or_else(|| {
                AppError::Validation(format!(
                    "status: Select a valid choice. {raw} is not one of the available choices."
                ))
            })?,
        };

        Ok(TaskFields {
            title,
            description: self.description.trim().to_string(),
            due_date: validate::optional_date("due_date", self.due_date.as_deref())?,
            status,
            assigned_to: validate::optional_uuid("assigned_to", self.assigned_to.as_deref())?,
        })
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct TaskList {
    pub project: Project,
    pub tasks: Vec<Task>,
    pub selected_status: Option<TaskStatus>,
}

#[derive(Serialize)]
pub struct TaskDetail {
    pub project: Project,
    pub task: Task,
    pub permissions: TaskPermissions,
}

#[derive(Serialize)]
pub struct TaskFormContext {
    pub project: Project,
    pub task: Option<Task>,
    pub form: FormDescription,
    pub statuses: Vec<StatusChoice>,
    pub users: Vec<PublicUser>,
}

fn project_not_found() -> AppError {
    AppError::NotFound("Project not found".to_string())
}

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".to_string())
}

/// An assignee cannot be an unknown user.
fn map_assignee_error(e: sqlx::Error) -> AppError {
    if db::is_foreign_key_violation(&e) {
        AppError::Validation(
            "assigned_to: Select a valid choice. That choice is not one of the available choices."
                .to_string(),
        )
    } else {
        AppError::Database(e)
    }
}

async fn owned_project(
    state: &SharedState,
    auth: &AuthUser,
    id: Uuid,
) -> Result<Project, AppError> {
    db::projects::find_owned_by(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(project_not_found)
}

async fn form_context(
    state: &SharedState,
    project: Project,
    task: Option<Task>,
) -> Result<TaskFormContext, AppError> {
    Ok(TaskFormContext {
        project,
        task,
        form: forms::task(),
        statuses: forms::status_choices(),
        users: db::users::list_active(&state.pool).await?,
    })
}

/// Visible tasks of a visible project. An unrecognized `status` means no filter.
pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath(project_id): IdPath<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<TaskList>, AppError> {
    let project = db::projects::find_visible(&state.pool, project_id, auth.user_id)
        .await?
        .ok_or_else(project_not_found)?;

    let status = query.status.as_deref().and_then(TaskStatus::parse);
    let tasks = db::tasks::list_visible(&state.pool, auth.user_id, project_id, status).await?;

    Ok(Json(TaskList {
        project,
        tasks,
        selected_status: status,
    }))
}

pub async fn new_form(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath(project_id): IdPath<Uuid>,
) -> Result<Json<TaskFormContext>, AppError> {
    let project = owned_project(&state, &auth, project_id).await?;
    Ok(Json(form_context(&state, project, None).await?))
}

/// Owner only. Any existing user may be assigned.
pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath(project_id): IdPath<Uuid>,
    Json(req): Json<TaskForm>,
) -> Result<Json<Task>, AppError> {
    let fields = req.clean()?;
    let task = db::tasks::create_in_owned_project(&state.pool, auth.user_id, project_id, &fields)
        .await
        .map_err(map_assignee_error)?
        .ok_or_else(project_not_found)?;
    tracing::info!(task_id = %task.id, project_id = %project_id, "Task created");
    Ok(Json(task))
}

pub async fn edit_form(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath((project_id, task_id)): IdPath<(Uuid, Uuid)>,
) -> Result<Json<TaskFormContext>, AppError> {
    let project = owned_project(&state, &auth, project_id).await?;
    let task = db::tasks::find_owned_by(&state.pool, auth.user_id, project_id, task_id)
        .await?
        .ok_or_else(task_not_found)?;
    Ok(Json(form_context(&state, project, Some(task)).await?))
}

/// Owner only; being the assignee does not grant edit rights.
pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath((project_id, task_id)): IdPath<(Uuid, Uuid)>,
    Json(req): Json<TaskForm>,
) -> Result<Json<Task>, AppError> {
    let fields = req.clean()?;
    let task = db::tasks::update_owned(&state.pool, auth.user_id, project_id, task_id, &fields)
        .await
        .map_err(map_assignee_error)?
        .ok_or_else(task_not_found)?;
    tracing::info!(task_id = %task.id, "Task updated");
    Ok(Json(task))
}

pub async fn delete_confirm(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath((project_id, task_id)): IdPath<(Uuid, Uuid)>,
) -> Result<Json<Task>, AppError> {
    let task = db::tasks::find_owned_by(&state.pool, auth.user_id, project_id, task_id)
        .await?
        .ok_or_else(task_not_found)?;
    Ok(Json(task))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath((project_id, task_id)): IdPath<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, AppError> {
    if !db::tasks::delete_owned(&state.pool, auth.user_id, project_id, task_id).await? {
        return Err(task_not_found());
    }
    tracing::info!(task_id = %task_id, project_id = %project_id, "Task deleted");
    Ok(Json(MessageResponse::new("Deleted")))
}

pub async fn detail(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath((project_id, task_id)): IdPath<(Uuid, Uuid)>,
) -> Result<Json<TaskDetail>, AppError> {
    let task = db::tasks::find_visible(&state.pool, auth.user_id, project_id, task_id)
        .await?
        .ok_or_else(task_not_found)?;
    // A visible task implies a visible project.
    let project = db::projects::find_visible(&state.pool, project_id, auth.user_id)
        .await?
        .ok_or_else(task_not_found)?;

    let permissions = TaskPermissions::for_user(auth.user_id, &project, &task);
    Ok(Json(TaskDetail {
        project,
        task,
        permissions,
    }))
}

/// Owner or assignee. An unknown `new_status` changes nothing and is not an error.
pub async fn change_status(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath((project_id, task_id, new_status)): IdPath<(Uuid, Uuid, String)>,
) -> Result<Redirect, AppError> {
    match TaskStatus::parse(&new_status) {
        Some(status) => {
            let task = db::tasks::set_status(&state.pool, auth.user_id, project_id, task_id, status)
                .await?
                .ok_or_else(task_not_found)?;
            tracing::info!(
                task_id = %task.id,
                status = %task.status,
                user_id = %auth.user_id,
                "Task status changed"
            );
        }
        None => {
            db::tasks::find_with_status_authority(&state.pool, auth.user_id, project_id, task_id)
                .await?
                .ok_or_else(task_not_found)?;
            tracing::debug!(
                task_id = %task_id,
                new_status = %new_status,
                "Ignoring unknown task status"
            );
        }
    }

    Ok(Redirect::to(&format!("/projects/{project_id}/tasks")))
}
