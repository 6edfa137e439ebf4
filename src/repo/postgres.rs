use sqlx::PgPool;

use super::Repository;
use crate::errors::AppError;
use crate::models::submission::{self, FormType, NewSubmission, ReviewItem, Status, Submission};
use crate::models::user::{self, NewUser, User};

/// [`Repository`] backed by a PostgreSQL pool.
#[derive(Clone, Debug)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Repository for PgRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        user::find_by_username(&self.pool, username).await
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        user::find_by_id(&self.pool, id).await
    }

    async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, AppError> {
        user::exists_by_username_or_email(&self.pool, username, email).await
    }

    async fn last_student_number(&self) -> Result<Option<u32>, AppError> {
        user::last_student_number(&self.pool).await
    }

    async fn count_students(&self) -> Result<i64, AppError> {
        user::count_students(&self.pool).await
    }

    async fn admin_exists(&self) -> Result<bool, AppError> {
        user::admin_exists(&self.pool).await
    }

    async fn create_user(&self, new: &NewUser) -> Result<User, AppError> {
        user::create(&self.pool, new).await
    }

    async fn create_submission(&self, new: &NewSubmission) -> Result<Submission, AppError> {
        submission::create(&self.pool, new).await
    }

    async fn find_submission(
        &self,
        form_type: FormType,
        id: i64,
    ) -> Result<Option<Submission>, AppError> {
        submission::find_by_id(&self.pool, form_type, id).await
    }

    async fn recent_submissions(
        &self,
        form_type: Option<FormType>,
        owner_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<ReviewItem>, AppError> {
        submission::find_recent(&self.pool, form_type, owner_id, limit).await
    }

    async fn count_submissions(
        &self,
        form_type: FormType,
        owner_id: Option<i64>,
        status: Option<Status>,
    ) -> Result<i64, AppError> {
        submission::count(&self.pool, form_type, owner_id, status).await
    }

    async fn update_status(
        &self,
        form_type: FormType,
        id: i64,
        status: Status,
    ) -> Result<bool, AppError> {
        submission::update_status(&self.pool, form_type, id, status).await
    }
}
