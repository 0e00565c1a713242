use serde::Serialize;

use crate::models::TaskStatus;

/// Shape of a form a client should render for a POST endpoint.
#[derive(Debug, Serialize)]
pub struct FormDescription {
    pub fields: Vec<FormField>,
}

#[derive(Debug, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub kind: &'static str,
    pub required: bool,
}

const fn field(name: &'static str, kind: &'static str, required: bool) -> FormField {
    FormField {
        name,
        kind,
        required,
    }
}

#[derive(Debug, Serialize)]
pub struct StatusChoice {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn status_choices() -> Vec<StatusChoice> {
    TaskStatus::ALL
        .iter()
        .map(|s| StatusChoice {
            value: s.as_str(),
            label: s.label(),
        })
        .collect()
}

pub fn signup() -> FormDescription {
    FormDescription {
        fields: vec![
            field("username", "text", true),
            field("email", "email", true),
            field("password", "password", true),
        ],
    }
}

pub fn login() -> FormDescription {
    FormDescription {
        fields: vec![field("email", "email", true), field("password", "password", true)],
    }
}

pub fn project() -> FormDescription {
    FormDescription {
        fields: vec![field("name", "text", true), field("description", "textarea", false)],
    }
}

pub fn task() -> FormDescription {
    FormDescription {
        fields: vec![
            field("title", "text", true),
            field("description", "textarea", false),
            field("due_date", "date", false),
            field("status", "select", false),
            field("assigned_to", "select", false),
        ],
    }
}
