//! Capability checks for every protected handler.
//!
//! Handlers call [`authorize`] before doing any work and get back a [`Scope`]
//! telling them which records the caller may see. Two roles exist:
//!
//! ```text
//! student  -> own submissions only
//! admin    -> every submission, plus review (status updates)
//! ```

use crate::auth::session::Principal;
use crate::errors::AppError;

/// What the caller is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Fill in and submit any of the forms.
    SubmitForms,
    /// See the per-user dashboard.
    ViewOwnDashboard,
    /// Read a single submission owned by `owner_id`.
    ViewSubmission { owner_id: i64 },
    /// Admin dashboard, admin lists and status updates.
    ReviewSubmissions,
}

/// Which records a granted capability covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only records owned by this user id.
    Own(i64),
    /// Every record.
    All,
}

impl Scope {
    /// Owner filter for repository queries: `None` means unfiltered.
    pub fn owner_filter(&self) -> Option<i64> {
        match self {
            Scope::Own(id) => Some(*id),
            Scope::All => None,
        }
    }

    pub fn covers(&self, owner_id: i64) -> bool {
        match self {
            Scope::Own(id) => *id == owner_id,
            Scope::All => true,
        }
    }
}

/// Decide whether `principal` holds `capability`.
///
/// Admins hold every capability with [`Scope::All`]. Students hold the
/// self-service capabilities scoped to their own id, and may read a
/// submission only when they own it.
pub fn authorize(principal: &Principal, capability: Capability) -> Result<Scope, AppError> {
    if principal.is_admin {
        return Ok(Scope::All);
    }
    let own = Scope::Own(principal.user_id);
    match capability {
        Capability::SubmitForms | Capability::ViewOwnDashboard => Ok(own),
        Capability::ViewSubmission { owner_id } if own.covers(owner_id) => Ok(own),
        Capability::ViewSubmission { owner_id } => {
            log::warn!(
                "User {} denied access to submission owned by {}",
                principal.user_id,
                owner_id
            );
            Err(AppError::NotAuthorized)
        }
        Capability::ReviewSubmissions => {
            log::warn!("User {} denied review access", principal.user_id);
            Err(AppError::NotAuthorized)
        }
    }
}
