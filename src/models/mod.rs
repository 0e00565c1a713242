mod project;
mod session;
mod task;
mod user;

pub use project::Project;
pub use session::Session;
pub use task::{Task, TaskStatus};
pub use user::{PublicUser, User};
