//! Field-level checks for form input. Text fields are trimmed before use.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use uuid::Uuid;

use crate::error::AppError;

pub const USERNAME_MAX: usize = 150;
pub const EMAIL_MAX: usize = 254;
pub const NAME_MAX: usize = 255;

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub fn required(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

pub fn max_chars(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub fn username(value: &str) -> Result<String, AppError> {
    let username = required("username", value)?;
    max_chars("username", &username, USERNAME_MAX)?;
    if !USERNAME_RE.is_match(&username) {
        return Err(AppError::Validation(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        ));
    }
    Ok(username)
}

/// Returns the address lowercased.
pub fn email(value: &str) -> Result<String, AppError> {
    let email = required("email", value)?.to_lowercase();
    max_chars("email", &email, EMAIL_MAX)?;
    if !EMAIL_RE.is_match(&email) {
        return Err(AppError::Validation("Enter a valid email address.".to_string()));
    }
    Ok(email)
}

/// `YYYY-MM-DD`; absent or blank means no date.
pub fn optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::Validation(format!("{field}: Enter a valid date."))),
    }
}

pub fn optional_uuid(field: &str, value: Option<&str>) -> Result<Option<Uuid>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| AppError::Validation(format!("{field}: Select a valid choice."))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Launch ").unwrap(), "Launch");
        assert!(matches!(required("name", "   "), Err(AppError::Validation(_))));
    }

    #[test]
    fn usernames() {
        assert_eq!(username("alice_01").unwrap(), "alice_01");
        assert!(username("a.b@c+d-e").is_ok());
        assert!(username("has space").is_err());
        assert!(username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn emails_are_lowercased() {
        assert_eq!(email(" Alice@Example.COM ").unwrap(), "alice@example.com");
        assert!(email("not-an-email").is_err());
        assert!(email("").is_err());
    }

    #[test]
    fn dates() {
        assert_eq!(optional_date("due_date", None).unwrap(), None);
        assert_eq!(optional_date("due_date", Some("")).unwrap(), None);
        assert_eq!(
            optional_date("due_date", Some("2026-03-01")).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert!(optional_date("due_date", Some("01/03/2026")).is_err());
    }

    #[test]
    fn uuids() {
        let id = Uuid::new_v4();
        assert_eq!(optional_uuid("assigned_to", Some(&id.to_string())).unwrap(), Some(id));
        assert_eq!(optional_uuid("assigned_to", Some(" ")).unwrap(), None);
        assert!(optional_uuid("assigned_to", Some("42")).is_err());
    }
}
