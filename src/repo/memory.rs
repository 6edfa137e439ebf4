use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::Repository;
use crate::errors::AppError;
use crate::models::submission::{FormType, NewSubmission, ReviewItem, Status, Submission};
use crate::models::user::{NewUser, User, parse_student_number};

#[derive(Default)]
struct State {
    users: Vec<User>,
    submissions: Vec<Submission>,
}

/// [`Repository`] held entirely in process memory. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    state: Arc<Mutex<State>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of stored users, admins included.
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    /// Number of stored submissions of every type.
    pub fn submission_count(&self) -> usize {
        self.lock().submissions.len()
    }
}

impl Repository for MemoryRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, AppError> {
        Ok(self
            .lock()
            .users
            .iter()
            .any(|u| u.username == username || u.email == email))
    }

    async fn last_student_number(&self) -> Result<Option<u32>, AppError> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter_map(|u| u.student_id.as_deref().and_then(parse_student_number))
            .max())
    }

    async fn count_students(&self) -> Result<i64, AppError> {
        Ok(self.lock().users.iter().filter(|u| !u.is_admin).count() as i64)
    }

    async fn admin_exists(&self) -> Result<bool, AppError> {
        Ok(self.lock().users.iter().any(|u| u.is_admin))
    }

    async fn create_user(&self, new: &NewUser) -> Result<User, AppError> {
        let mut state = self.lock();
        let collides = state.users.iter().any(|u| {
            u.username == new.username
                || u.email == new.email
                || (new.student_id.is_some() && u.student_id == new.student_id)
        });
        if collides {
            return Err(AppError::DuplicateIdentity);
        }
        let user = User {
            id: state.users.len() as i64 + 1,
            username: new.username.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            full_name: new.full_name.clone(),
            student_id: new.student_id.clone(),
            is_admin: new.is_admin,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn create_submission(&self, new: &NewSubmission) -> Result<Submission, AppError> {
        let mut state = self.lock();
        if !state.users.iter().any(|u| u.id == new.user_id) {
            return Err(AppError::NotFound);
        }
        let submission = Submission {
            id: state.submissions.len() as i64 + 1,
            form_type: new.form_type,
            user_id: new.user_id,
            fields: new.fields.clone(),
            status: Status::Pending,
            created_at: Utc::now(),
        };
        state.submissions.push(submission.clone());
        Ok(submission)
    }

    async fn find_submission(
        &self,
        form_type: FormType,
        id: i64,
    ) -> Result<Option<Submission>, AppError> {
        Ok(self
            .lock()
            .submissions
            .iter()
            .find(|s| s.form_type == form_type && s.id == id)
            .cloned())
    }

    async fn recent_submissions(
        &self,
        form_type: Option<FormType>,
        owner_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<ReviewItem>, AppError> {
        let state = self.lock();
        let mut matching: Vec<&Submission> = state
            .submissions
            .iter()
            .filter(|s| form_type.is_none_or(|t| s.form_type == t))
            .filter(|s| owner_id.is_none_or(|id| s.user_id == id))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let limit = limit.map_or(usize::MAX, |n| n.max(0) as usize);
        let items = matching
            .into_iter()
            .take(limit)
            .filter_map(|s| {
                let owner = state.users.iter().find(|u| u.id == s.user_id)?;
                Some(ReviewItem {
                    submission: s.clone(),
                    student_name: owner.full_name.clone(),
                    student_id: owner.student_id.clone(),
                })
            })
            .collect();
        Ok(items)
    }

    async fn count_submissions(
        &self,
        form_type: FormType,
        owner_id: Option<i64>,
        status: Option<Status>,
    ) -> Result<i64, AppError> {
        Ok(self
            .lock()
            .submissions
            .iter()
            .filter(|s| s.form_type == form_type)
            .filter(|s| owner_id.is_none_or(|id| s.user_id == id))
            .filter(|s| status.is_none_or(|st| s.status == st))
            .count() as i64)
    }

    async fn update_status(
        &self,
        form_type: FormType,
        id: i64,
        status: Status,
    ) -> Result<bool, AppError> {
        let mut state = self.lock();
        match state
            .submissions
            .iter_mut()
            .find(|s| s.form_type == form_type && s.id == id)
        {
            Some(s) => {
                s.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
