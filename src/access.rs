//! Who may see and who may change projects and tasks.
//!
//! Every rule exists twice: as a pure predicate over rows already in memory,
//! and as a SQL fragment the `db` layer splices into its `WHERE` clauses so
//! that the check and the read (or write) are one statement. The integration
//! tests hold the two renderings against each other.
//!
//! SQL fragments follow one binding convention: the requesting user id is
//! always `$1`, `p` aliases `projects` and `t` aliases `tasks`.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Project, Task, TaskStatus};

/// A project is visible to its owner and to anyone assigned a task in it.
pub const PROJECT_VISIBLE_SQL: &str = "(p.owner_id = $1 OR EXISTS (\
     SELECT 1 FROM tasks vt WHERE vt.project_id = p.id AND vt.assigned_to = $1))";

/// A task is visible to the owner of its project and to its assignee.
pub const TASK_VISIBLE_SQL: &str = "(p.owner_id = $1 OR t.assigned_to = $1)";

/// Status changes are allowed for exactly the people who can see the task.
pub const TASK_STATUS_AUTHORITY_SQL: &str = TASK_VISIBLE_SQL;

/// Structural changes to a project and its tasks belong to the owner alone.
pub const PROJECT_OWNER_SQL: &str = "(p.owner_id = $1)";

pub fn is_owner(user_id: Uuid, project: &Project) -> bool {
    project.owner_id == user_id
}

/// `tasks` may contain rows from other projects; only the project's own count.
pub fn project_visible(user_id: Uuid, project: &Project, tasks: &[Task]) -> bool {
    is_owner(user_id, project)
        || tasks
            .iter()
            .any(|t| t.project_id == project.id && t.assigned_to == Some(user_id))
}

pub fn task_visible(user_id: Uuid, project: &Project, task: &Task) -> bool {
    task.project_id == project.id
        && (is_owner(user_id, project) || task.assigned_to == Some(user_id))
}

/// Edit and delete. Being the assignee is not enough.
pub fn can_edit_task(user_id: Uuid, project: &Project, task: &Task) -> bool {
    task.project_id == project.id && is_owner(user_id, project)
}

pub fn can_change_status(user_id: Uuid, project: &Project, task: &Task) -> bool {
    task_visible(user_id, project, task)
}

/// Distinct projects visible to `user_id`, in input order.
pub fn visible_projects<'a>(
    user_id: Uuid,
    projects: &'a [Project],
    tasks: &[Task],
) -> Vec<&'a Project> {
    projects
        .iter()
        .filter(|p| project_visible(user_id, p, tasks))
        .collect()
}

/// Tasks of `project` visible to `user_id`, optionally narrowed to one status.
pub fn visible_tasks<'a>(
    user_id: Uuid,
    project: &Project,
    tasks: &'a [Task],
    status: Option<TaskStatus>,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| task_visible(user_id, project, t))
        .filter(|t| status.is_none_or(|s| t.status == s))
        .collect()
}

/// What the requester may do with a task, for clients deciding which controls to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskPermissions {
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_change_status: bool,
}

impl TaskPermissions {
    pub fn for_user(user_id: Uuid, project: &Project, task: &Task) -> Self {
        let can_edit = can_edit_task(user_id, project, task);
        TaskPermissions {
            can_edit,
            can_delete: can_edit,
            can_change_status: can_change_status(user_id, project, task),
        }
    }
}
