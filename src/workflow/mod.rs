//! Operations behind the HTTP handlers: registration and login, form
//! submission, review and dashboard aggregation. Every operation takes its
//! repository explicitly and checks access before touching data.

pub mod dashboard;
pub mod identity;
pub mod review;
pub mod submission;
