// Template context structures for Askama templates, organized by page area.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{Flash, Principal, current_principal, take_flash};

/// Common context shared by all pages.
/// Templates access these as `ctx.user`, `ctx.flash`, `ctx.csrf_token`.
pub struct PageContext {
    pub user: Option<Principal>,
    pub flash: Option<Flash>,
    pub csrf_token: String,
    pub current_path: String,
}

impl PageContext {
    /// Context for pages behind the login wall.
    pub fn build(session: &Session, user: &Principal, current_path: &str) -> Self {
        Self::with_user(session, Some(user.clone()), current_path)
    }

    /// Context for pages anyone can see; `user` is filled in when logged in.
    pub fn public(session: &Session, current_path: &str) -> Self {
        Self::with_user(session, current_principal(session).ok(), current_path)
    }

    fn with_user(session: &Session, user: Option<Principal>, current_path: &str) -> Self {
        PageContext {
            user,
            flash: take_flash(session),
            csrf_token: csrf::get_or_create_token(session),
            current_path: current_path.to_string(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    pub fn is_active(&self, path: &str) -> bool {
        self.current_path == path
    }
}

mod admin;
mod common;
mod dashboard;
mod form;

pub use self::admin::AdminFormsTemplate;
pub use self::common::{IndexTemplate, LoginTemplate, RegisterTemplate};
pub use self::dashboard::{AdminDashboardTemplate, StudentDashboardTemplate};
pub use self::form::{BonafideCertificateTemplate, FormPageTemplate, FormSuccessTemplate};
