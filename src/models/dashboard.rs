use super::submission::{FormType, ReviewItem, Submission};

pub const STUDENT_RECENT_LIMIT: usize = 10;
pub const ADMIN_RECENT_LIMIT: usize = 20;

/// Number of submissions of one form type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeCount {
    pub form_type: FormType,
    pub count: i64,
}

/// Aggregates for a student's own dashboard.
#[derive(Debug, Clone)]
pub struct StudentStats {
    pub counts: Vec<TypeCount>,
    pub recent: Vec<Submission>,
}

impl StudentStats {
    pub fn count_for(&self, form_type: FormType) -> i64 {
        count_for(&self.counts, form_type)
    }

    pub fn total(&self) -> i64 {
        self.counts.iter().map(|c| c.count).sum()
    }
}

/// Aggregates across all users for the admin dashboard.
#[derive(Debug, Clone)]
pub struct AdminStats {
    pub total_students: i64,
    pub counts: Vec<TypeCount>,
    pub pending_total: i64,
    pub recent: Vec<ReviewItem>,
}

impl AdminStats {
    pub fn count_for(&self, form_type: FormType) -> i64 {
        count_for(&self.counts, form_type)
    }

    pub fn total(&self) -> i64 {
        self.counts.iter().map(|c| c.count).sum()
    }
}

fn count_for(counts: &[TypeCount], form_type: FormType) -> i64 {
    counts
        .iter()
        .find(|c| c.form_type == form_type)
        .map(|c| c.count)
        .unwrap_or(0)
}
