pub mod admin_handlers;
pub mod auth_handlers;
pub mod dashboard;
pub mod form_handlers;
pub mod upload_handlers;
