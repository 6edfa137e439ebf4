use crate::auth::access::{Capability, authorize};
use crate::auth::session::Principal;
use crate::errors::AppError;
use crate::models::dashboard::{
    ADMIN_RECENT_LIMIT, AdminStats, STUDENT_RECENT_LIMIT, StudentStats, TypeCount,
};
use crate::models::submission::{FormType, Status};
use crate::repo::Repository;

async fn counts_by_type<R: Repository>(
    repo: &R,
    owner_id: Option<i64>,
    status: Option<Status>,
) -> Result<Vec<TypeCount>, AppError> {
    let mut counts = Vec::with_capacity(FormType::ALL.len());
    for form_type in FormType::ALL {
        let count = repo.count_submissions(form_type, owner_id, status).await?;
        counts.push(TypeCount { form_type, count });
    }
    Ok(counts)
}

/// Per-type counts and latest submissions for the caller's own records.
pub async fn student_stats<R: Repository>(
    repo: &R,
    principal: &Principal,
) -> Result<StudentStats, AppError> {
    authorize(principal, Capability::ViewOwnDashboard)?;
    let owner = Some(principal.user_id);

    let counts = counts_by_type(repo, owner, None).await?;
    let recent = repo
        .recent_submissions(None, owner, Some(STUDENT_RECENT_LIMIT as i64))
        .await?
        .into_iter()
        .map(|item| item.submission)
        .collect();
    Ok(StudentStats { counts, recent })
}

/// Global counts, pending total and latest submissions across all users.
pub async fn admin_stats<R: Repository>(
    repo: &R,
    principal: &Principal,
) -> Result<AdminStats, AppError> {
    authorize(principal, Capability::ReviewSubmissions)?;

    let total_students = repo.count_students().await?;
    let counts = counts_by_type(repo, None, None).await?;
    let pending_total = counts_by_type(repo, None, Some(Status::Pending))
        .await?
        .iter()
        .map(|c| c.count)
        .sum();
    let recent = repo
        .recent_submissions(None, None, Some(ADMIN_RECENT_LIMIT as i64))
        .await?;
    Ok(AdminStats { total_students, counts, pending_total, recent })
}
