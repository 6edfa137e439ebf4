//! Persistence boundary for the workflow layer.
//!
//! Workflow operations take a `&impl Repository` instead of reaching for a
//! global pool, so the same code runs against PostgreSQL in the server and
//! against [`MemoryRepository`] in tests.

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use crate::errors::AppError;
use crate::models::submission::{FormType, NewSubmission, ReviewItem, Status, Submission};
use crate::models::user::{NewUser, User};

#[allow(async_fn_in_trait)]
pub trait Repository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// True when the username or the email belongs to an existing user.
    async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, AppError>;

    /// Numeric suffix of the last assigned `STU###` id.
    async fn last_student_number(&self) -> Result<Option<u32>, AppError>;

    /// Number of non-admin users.
    async fn count_students(&self) -> Result<i64, AppError>;

    async fn admin_exists(&self) -> Result<bool, AppError>;

    /// Insert a user; unique collisions are `DuplicateIdentity`.
    async fn create_user(&self, new: &NewUser) -> Result<User, AppError>;

    /// Insert a pending submission.
    async fn create_submission(&self, new: &NewSubmission) -> Result<Submission, AppError>;

    async fn find_submission(
        &self,
        form_type: FormType,
        id: i64,
    ) -> Result<Option<Submission>, AppError>;

    /// Newest first. `None` filters match everything; `limit: None` is unbounded.
    async fn recent_submissions(
        &self,
        form_type: Option<FormType>,
        owner_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<ReviewItem>, AppError>;

    async fn count_submissions(
        &self,
        form_type: FormType,
        owner_id: Option<i64>,
        status: Option<Status>,
    ) -> Result<i64, AppError>;

    /// Returns false when the id does not exist for that form type.
    async fn update_status(
        &self,
        form_type: FormType,
        id: i64,
        status: Status,
    ) -> Result<bool, AppError>;
}
