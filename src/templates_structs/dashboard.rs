use askama::Template;

use super::PageContext;
use crate::models::dashboard::{AdminStats, StudentStats};

#[derive(Template)]
#[template(path = "student_dashboard.html")]
pub struct StudentDashboardTemplate {
    pub ctx: PageContext,
    pub stats: StudentStats,
}

#[derive(Template)]
#[template(path = "admin_dashboard.html")]
pub struct AdminDashboardTemplate {
    pub ctx: PageContext,
    pub stats: AdminStats,
}
