use crate::auth::access::{Capability, authorize};
use crate::auth::session::Principal;
use crate::errors::AppError;
use crate::models::submission::{FormType, ReviewItem, Status, Submission};
use crate::models::user::User;
use crate::repo::Repository;

/// Load one submission and its owner, if the caller may see it.
pub async fn view_submission<R: Repository>(
    repo: &R,
    principal: &Principal,
    form_type: FormType,
    id: i64,
) -> Result<(Submission, User), AppError> {
    let submission = repo
        .find_submission(form_type, id)
        .await?
        .ok_or(AppError::NotFound)?;
    authorize(principal, Capability::ViewSubmission { owner_id: submission.user_id })?;
    let owner = repo
        .find_user_by_id(submission.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok((submission, owner))
}

/// Every submission of one type, newest first, with owner details. Admin only.
pub async fn list_for_review<R: Repository>(
    repo: &R,
    principal: &Principal,
    form_type: FormType,
) -> Result<Vec<ReviewItem>, AppError> {
    let scope = authorize(principal, Capability::ReviewSubmissions)?;
    repo.recent_submissions(Some(form_type), scope.owner_filter(), None).await
}

/// Set the status of a submission. Admin only; any status may follow any other.
pub async fn update_status<R: Repository>(
    repo: &R,
    principal: &Principal,
    form_type: FormType,
    id: i64,
    new_status: &str,
) -> Result<Status, AppError> {
    authorize(principal, Capability::ReviewSubmissions)?;
    let current = repo
        .find_submission(form_type, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let status: Status = new_status.trim().parse()?;

    if !repo.update_status(form_type, id, status).await? {
        return Err(AppError::NotFound);
    }
    log::info!(
        "Admin {} changed {} form #{} from {} to {}",
        principal.user_id,
        form_type,
        id,
        current.status,
        status
    );
    Ok(status)
}
