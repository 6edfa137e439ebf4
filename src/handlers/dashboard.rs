use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::session::Principal;
use crate::errors::{AppError, redirect, render};
use crate::repo::Repository;
use crate::templates_structs::{AdminDashboardTemplate, PageContext, StudentDashboardTemplate};
use crate::workflow::dashboard;

pub async fn student<R: Repository + 'static>(
    repo: web::Data<R>,
    session: Session,
    principal: Principal,
) -> Result<HttpResponse, AppError> {
    if principal.is_admin {
        return Ok(redirect("/admin_dashboard"));
    }

    let stats = dashboard::student_stats(repo.get_ref(), &principal).await?;
    let ctx = PageContext::build(&session, &principal, "/student_dashboard");
    render(StudentDashboardTemplate { ctx, stats })
}

pub async fn admin<R: Repository + 'static>(
    repo: web::Data<R>,
    session: Session,
    principal: Principal,
) -> Result<HttpResponse, AppError> {
    let stats = match dashboard::admin_stats(repo.get_ref(), &principal).await {
        Ok(stats) => stats,
        Err(e) => return e.recover(&session, principal.home()),
    };

    let ctx = PageContext::build(&session, &principal, "/admin_dashboard");
    render(AdminDashboardTemplate { ctx, stats })
}
