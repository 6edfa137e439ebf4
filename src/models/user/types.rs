use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const STUDENT_ID_PREFIX: &str = "STU";

/// Size of the sequential student id pool (STU001..=STU300).
pub const MAX_STUDENTS: u32 = 300;

/// Stored account, password hash included.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub student_id: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// New user data for creation. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub student_id: Option<String>,
    pub is_admin: bool,
}

/// Form data from the registration page.
#[derive(Debug, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub password2: String,
    pub csrf_token: String,
}

/// Form data from the login page.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub csrf_token: String,
    /// Page to return to after login, carried through from `?next=`.
    #[serde(default)]
    pub next: Option<String>,
}

/// Query string of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// `STU` + zero-padded three digit number.
pub fn format_student_id(n: u32) -> String {
    format!("{STUDENT_ID_PREFIX}{n:03}")
}

/// Numeric suffix of a `STU###` id, `None` for anything else.
pub fn parse_student_number(student_id: &str) -> Option<u32> {
    let digits = student_id.strip_prefix(STUDENT_ID_PREFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_three_digits() {
        assert_eq!(format_student_id(1), "STU001");
        assert_eq!(format_student_id(42), "STU042");
        assert_eq!(format_student_id(300), "STU300");
    }

    #[test]
    fn parses_only_stu_ids() {
        assert_eq!(parse_student_number("STU001"), Some(1));
        assert_eq!(parse_student_number("STU300"), Some(300));
        assert_eq!(parse_student_number("STU"), None);
        assert_eq!(parse_student_number("ADM001"), None);
        assert_eq!(parse_student_number("STU1a"), None);
    }
}
