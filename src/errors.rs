use actix_session::Session;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use askama::Template;
use std::fmt;

use crate::auth::session::{Flash, set_flash};

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Migrate(sqlx::migrate::MigrateError),
    Template(askama::Error),
    Io(std::io::Error),
    Hash(String),
    Session(String),
    Multipart(String),
    Csrf,
    Validation(Vec<String>),
    DuplicateIdentity,
    CapacityExceeded,
    InvalidCredentials,
    NotAuthorized,
    NotFound,
    InvalidStatus(String),
    UnsupportedFileType(String),
    UnknownFormType(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Migrate(e) => write!(f, "Migration error: {e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Io(e) => write!(f, "I/O error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Multipart(e) => write!(f, "Multipart error: {e}"),
            AppError::Csrf => write!(f, "Invalid or missing CSRF token"),
            AppError::Validation(errors) => write!(f, "Validation failed: {}", errors.join("; ")),
            AppError::DuplicateIdentity => write!(f, "Username or email already exists"),
            AppError::CapacityExceeded => write!(f, "Maximum student limit reached (STU300)"),
            AppError::InvalidCredentials => write!(f, "Invalid username or password"),
            AppError::NotAuthorized => write!(f, "Access denied"),
            AppError::NotFound => write!(f, "Not found"),
            AppError::InvalidStatus(s) => write!(f, "Invalid status '{s}'"),
            AppError::UnsupportedFileType(name) => write!(f, "Unsupported file type: {name}"),
            AppError::UnknownFormType(t) => write!(f, "Unknown form type '{t}'"),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Errors caused by the caller's input or role, as opposed to infrastructure failures.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::DuplicateIdentity
                | AppError::CapacityExceeded
                | AppError::InvalidCredentials
                | AppError::NotAuthorized
                | AppError::NotFound
                | AppError::InvalidStatus(_)
                | AppError::UnsupportedFileType(_)
                | AppError::UnknownFormType(_)
        )
    }

    /// Bilingual (Marathi / English) message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(errors) => {
                format!("कृपया माहिती तपासा / Please check the form: {}", errors.join("; "))
            }
            AppError::DuplicateIdentity => {
                "वापरकर्ता नाव किंवा ईमेल आधीपासून अस्तित्वात आहे / Username or email already exists".to_string()
            }
            AppError::CapacityExceeded => {
                "विद्यार्थी मर्यादा पूर्ण झाली / Maximum student limit reached (STU300)".to_string()
            }
            AppError::InvalidCredentials => {
                "चुकीचे वापरकर्ता नाव किंवा पासवर्ड / Invalid username or password".to_string()
            }
            AppError::NotAuthorized => "प्रवेश नाकारला / Access denied".to_string(),
            AppError::NotFound => "माहिती सापडली नाही / Record not found".to_string(),
            AppError::InvalidStatus(_) => "अवैध स्थिती / Invalid status".to_string(),
            AppError::UnsupportedFileType(name) => {
                format!("फक्त चित्र फाइल्स / Images only! ({name})")
            }
            AppError::UnknownFormType(_) => "अवैध फॉर्म प्रकार / Invalid form type".to_string(),
            _ => "काहीतरी चूक झाली / Something went wrong".to_string(),
        }
    }

    /// Convert a user-facing error into a flash message plus redirect.
    /// Infrastructure errors are passed through untouched.
    pub fn recover(self, session: &Session, location: &str) -> Result<HttpResponse, AppError> {
        if self.is_user_facing() {
            log::debug!("Recovering from '{self}' with redirect to {location}");
            set_flash(session, Flash::danger(self.user_message()));
            Ok(redirect(location))
        } else {
            Err(self)
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::NotAuthorized | AppError::Csrf => StatusCode::FORBIDDEN,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            e if e.is_user_facing() => StatusCode::BAD_REQUEST,
            AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => {
                log::error!("{self}");
                HttpResponse::InternalServerError().body("Internal Server Error")
            }
            StatusCode::NOT_FOUND => HttpResponse::NotFound().body("Not Found"),
            status => HttpResponse::build(status).body(self.user_message()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::Migrate(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e)
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(e: actix_multipart::MultipartError) -> Self {
        AppError::Multipart(e.to_string())
    }
}

/// Render an askama template into an HTML response.
pub fn render(tmpl: impl Template) -> Result<HttpResponse, AppError> {
    let body = tmpl.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// 303 See Other to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location.to_string()))
        .finish()
}
