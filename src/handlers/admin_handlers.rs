use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::csrf;
use crate::auth::session::{Flash, Principal, set_flash};
use crate::errors::{AppError, redirect, render};
use crate::models::submission::{FormType, Status};
use crate::repo::Repository;
use crate::templates_structs::{AdminFormsTemplate, PageContext};
use crate::workflow::review;

#[derive(Deserialize)]
pub struct StatusForm {
    pub status: String,
    pub csrf_token: String,
}

pub async fn forms_list<R: Repository + 'static>(
    repo: web::Data<R>,
    session: Session,
    principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let listed = match path.parse::<FormType>() {
        Ok(form_type) => review::list_for_review(repo.get_ref(), &principal, form_type)
            .await
            .map(|items| (form_type, items)),
        Err(e) => Err(e),
    };
    let (form_type, items) = match listed {
        Ok(listed) => listed,
        Err(e) => return e.recover(&session, principal.home()),
    };

    let ctx = PageContext::build(&session, &principal, &format!("/admin/forms/{}", form_type.slug()));
    render(AdminFormsTemplate { ctx, form_type, items, statuses: Status::ALL })
}

pub async fn update_status<R: Repository + 'static>(
    repo: web::Data<R>,
    session: Session,
    principal: Principal,
    path: web::Path<(String, i64)>,
    form: web::Form<StatusForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let (slug, id) = path.into_inner();

    let form_type = match slug.parse::<FormType>() {
        Ok(form_type) => form_type,
        Err(e) => return e.recover(&session, principal.home()),
    };
    let back = if principal.is_admin {
        format!("/admin/forms/{}", form_type.slug())
    } else {
        principal.home().to_string()
    };

    match review::update_status(repo.get_ref(), &principal, form_type, id, &form.status).await {
        Ok(_) => {
            set_flash(&session, Flash::success("स्थिती अद्यतनित केली गेली / Status updated"));
            Ok(redirect(&back))
        }
        Err(e) => e.recover(&session, &back),
    }
}
