use std::future::{Ready, ready};

use actix_session::Session;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::user::User;

/// The authenticated caller, reconstructed from the session on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub is_admin: bool,
}

impl Principal {
    /// Landing page for this principal after login.
    pub fn home(&self) -> &'static str {
        if self.is_admin { "/admin_dashboard" } else { "/student_dashboard" }
    }
}

impl From<&User> for Principal {
    fn from(u: &User) -> Self {
        Principal {
            user_id: u.id,
            username: u.username.clone(),
            full_name: u.full_name.clone(),
            is_admin: u.is_admin,
        }
    }
}

/// Available on routes behind `require_auth`, which resolves it once per request.
impl FromRequest for Principal {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(req.extensions().get::<Principal>().cloned().ok_or(AppError::NotAuthorized))
    }
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flash {
    pub level: String,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Flash { level: "success".to_string(), message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Flash { level: "info".to_string(), message: message.into() }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Flash { level: "danger".to_string(), message: message.into() }
    }
}

/// A post-login target, if it is a plain path on this site.
///
/// Only absolute paths made of `[A-Za-z0-9/_.-]` qualify, which rules out
/// `//host`, schemes, query strings and encoded characters. `/logout` and
/// `/login` are refused.
pub fn safe_next(target: &str) -> Option<&str> {
    let plain = target.starts_with('/')
        && !target.starts_with("//")
        && target
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-' | '.'));
    (plain && !matches!(target, "/login" | "/logout")).then_some(target)
}

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

/// Store the logged-in user in the session.
pub fn login(session: &Session, user: &User) -> Result<(), AppError> {
    session.renew();
    session
        .insert("user_id", user.id)
        .and_then(|_| session.insert("username", &user.username))
        .and_then(|_| session.insert("full_name", &user.full_name))
        .and_then(|_| session.insert("is_admin", user.is_admin))
        .map_err(|e| AppError::Session(e.to_string()))
}

pub fn current_principal(session: &Session) -> Result<Principal, AppError> {
    let user_id = get_user_id(session)
        .ok_or_else(|| AppError::Session("Not authenticated".to_string()))?;
    let username = session
        .get::<String>("username")
        .map_err(|e| AppError::Session(e.to_string()))?
        .unwrap_or_default();
    let full_name = session
        .get::<String>("full_name")
        .map_err(|e| AppError::Session(e.to_string()))?
        .unwrap_or_default();
    let is_admin = session
        .get::<bool>("is_admin")
        .map_err(|e| AppError::Session(e.to_string()))?
        .unwrap_or(false);
    Ok(Principal { user_id, username, full_name, is_admin })
}

pub fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert("flash", &flash) {
        log::warn!("Could not store flash message: {e}");
    }
}

pub fn take_flash(session: &Session) -> Option<Flash> {
    let flash = session.get::<Flash>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}
