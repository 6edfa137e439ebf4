//! Shared test infrastructure for workflow and HTTP tests.
//!
//! Everything runs against `MemoryRepository` and a temporary upload
//! directory, so no database is needed.
//!
//! - `setup()` - fresh repository plus upload store
//! - `register_student()` / `seed_admin()` - accounts through the real workflow
//! - `seed_students()` - bulk accounts inserted directly (no password hashing)

#![allow(dead_code)]

use tempfile::TempDir;

use shala::auth::session::Principal;
use shala::models::user::{NewUser, User, format_student_id};
use shala::repo::{MemoryRepository, Repository};
use shala::uploads::UploadStore;
use shala::workflow::identity::{self, Registration};
use shala::workflow::submission::SubmissionInput;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "admin123";
pub const ADMIN_EMAIL: &str = "admin@school.local";
pub const STUDENT_PASS: &str = "secret1";
pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

// ============================================================================
// ENVIRONMENT
// ============================================================================

pub struct TestEnv {
    pub repo: MemoryRepository,
    pub uploads: UploadStore,
    /// Keeps the upload directory alive for the lifetime of the test.
    pub dir: TempDir,
}

pub fn setup() -> TestEnv {
    setup_with_limit(MAX_UPLOAD_BYTES)
}

pub fn setup_with_limit(max_bytes: usize) -> TestEnv {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let uploads = UploadStore::new(dir.path().join("uploads"), max_bytes);
    std::fs::create_dir_all(uploads.dir()).expect("Failed to create upload dir");
    TestEnv { repo: MemoryRepository::new(), uploads, dir }
}

/// Number of files currently in the upload directory.
pub fn stored_files(env: &TestEnv) -> usize {
    std::fs::read_dir(env.uploads.dir())
        .map(|entries| entries.count())
        .unwrap_or(0)
}

// ============================================================================
// ACCOUNTS
// ============================================================================

pub fn registration(username: &str, full_name: &str) -> Registration {
    Registration {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        full_name: full_name.to_string(),
        password: STUDENT_PASS.to_string(),
        password_confirm: STUDENT_PASS.to_string(),
    }
}

pub async fn register_student(repo: &MemoryRepository, username: &str, full_name: &str) -> User {
    identity::register(repo, &registration(username, full_name))
        .await
        .expect("Failed to register student")
}

pub async fn seed_admin(repo: &MemoryRepository) -> User {
    identity::bootstrap_admin(repo, ADMIN_USER, ADMIN_EMAIL, ADMIN_PASS)
        .await
        .expect("Failed to bootstrap admin")
        .expect("Admin already existed")
}

/// Insert students STU001..=STU{count} without hashing passwords.
pub async fn seed_students(repo: &MemoryRepository, count: u32) {
    for n in 1..=count {
        repo.create_user(&NewUser {
            username: format!("student{n}"),
            email: format!("student{n}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            full_name: format!("Student {n}"),
            student_id: Some(format_student_id(n)),
            is_admin: false,
        })
        .await
        .expect("Failed to seed student");
    }
}

pub fn principal(user: &User) -> Principal {
    Principal::from(user)
}

// ============================================================================
// FORM INPUT
// ============================================================================

/// Complete bonafide request for `student_name`.
pub fn bonafide_input(student_name: &str) -> SubmissionInput {
    SubmissionInput::default()
        .text("student_name", student_name)
        .text("academic_year", "2024-25")
        .text("class_standard", "8")
        .text("division", "A")
        .text("conduct", "Good")
        .text("caste", "Maratha")
        .text("birth_date", "2011-06-15")
        .text("birth_place", "Pune")
        .text("school_place", "Shirur")
}

/// Admission request with only the required text fields.
pub fn admission_input() -> SubmissionInput {
    SubmissionInput::default()
        .text("school_name", "Zilla Parishad School")
        .text("first_name_marathi", "आशा")
        .text("last_name_marathi", "पाटील")
        .text("father_name", "Ramesh Patil")
        .text("mother_name", "Sunita Patil")
        .text("parent_full_name", "Ramesh Patil")
        .text("address", "At post Shirur, Pune")
}

pub fn hostel_input() -> SubmissionInput {
    SubmissionInput::default()
        .text("hostel_name", "Government Hostel")
        .text("parent_name", "Ramesh Patil")
        .text("parent_address", "Shirur")
        .text("student_name", "Asha Patil")
        .text("student_address", "Shirur")
        .text("age_years", "13")
}

/// Case record touching each typed field kind.
pub fn case_record_input() -> SubmissionInput {
    SubmissionInput::default()
        .text("name", "Asha Patil")
        .text("birth_date", "2011-06-15")
        .text("age", "13")
        .text("gender", "female")
        .text("father_name", "Ramesh Patil")
        .text("guardian_mobile", "9876543210")
        .text("complaint_details", "Finds it hard to concentrate in class.")
}
