use std::net::{IpAddr, Ipv4Addr};

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::rate_limit::LoginThrottle;
use crate::auth::session::{self, Flash, current_principal, safe_next, set_flash};
use crate::auth::csrf;
use crate::errors::{AppError, redirect, render};
use crate::models::user::{LoginForm, NextQuery, RegistrationForm};
use crate::repo::Repository;
use crate::templates_structs::{IndexTemplate, LoginTemplate, PageContext, RegisterTemplate};
use crate::workflow::identity::{self, Registration};

fn client_ip(req: &HttpRequest) -> IpAddr {
    req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn index(session: Session) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::public(&session, "/");
    render(IndexTemplate { ctx })
}

fn next_target(next: Option<&str>) -> String {
    next.and_then(safe_next).unwrap_or_default().to_string()
}

pub async fn login_page(
    session: Session,
    query: web::Query<NextQuery>,
) -> Result<HttpResponse, AppError> {
    let next = next_target(query.next.as_deref());
    // Already logged in: go straight on
    if let Ok(principal) = current_principal(&session) {
        return Ok(redirect(if next.is_empty() { principal.home() } else { next.as_str() }));
    }
    let ctx = PageContext::public(&session, "/login");
    render(LoginTemplate { ctx, error: None, username: String::new(), next })
}

pub async fn login_submit<R: Repository + 'static>(
    req: HttpRequest,
    repo: web::Data<R>,
    session: Session,
    throttle: web::Data<LoginThrottle>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let next = next_target(form.next.as_deref());

    // Throttle check BEFORE any database access
    let ip = client_ip(&req);
    if throttle.is_blocked(ip) {
        log::warn!("Login from {ip} blocked after repeated failures");
        let ctx = PageContext::public(&session, "/login");
        return render(LoginTemplate {
            ctx,
            error: Some(
                "खूप अयशस्वी प्रयत्न, नंतर पुन्हा प्रयत्न करा / Too many failed login attempts. Please try again later."
                    .to_string(),
            ),
            username: form.username.clone(),
            next,
        });
    }

    match identity::authenticate(repo.get_ref(), &form.username, &form.password).await {
        Ok(user) => {
            throttle.clear(ip);
            session::login(&session, &user)?;
            set_flash(
                &session,
                Flash::success(format!("स्वागत आहे / Welcome, {}!", user.full_name)),
            );
            let home = if user.is_admin { "/admin_dashboard" } else { "/student_dashboard" };
            Ok(redirect(if next.is_empty() { home } else { next.as_str() }))
        }
        Err(e @ AppError::InvalidCredentials) => {
            throttle.record_failure(ip);
            let ctx = PageContext::public(&session, "/login");
            render(LoginTemplate {
                ctx,
                error: Some(e.user_message()),
                username: form.username.clone(),
                next,
            })
        }
        Err(e) => Err(e),
    }
}

pub async fn register_page(session: Session) -> Result<HttpResponse, AppError> {
    if let Ok(principal) = current_principal(&session) {
        return Ok(redirect(principal.home()));
    }
    let ctx = PageContext::public(&session, "/register");
    render(RegisterTemplate {
        ctx,
        errors: Vec::new(),
        username: String::new(),
        email: String::new(),
        full_name: String::new(),
    })
}

pub async fn register_submit<R: Repository + 'static>(
    repo: web::Data<R>,
    session: Session,
    form: web::Form<RegistrationForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let registration = Registration::from(&form.into_inner());
    let errors = match identity::register(repo.get_ref(), &registration).await {
        Ok(user) => {
            set_flash(
                &session,
                Flash::success(format!(
                    "नोंदणी यशस्वी झाली! / Registration successful! Your Student ID: {}",
                    user.student_id.as_deref().unwrap_or("-")
                )),
            );
            return Ok(redirect("/login"));
        }
        Err(AppError::Validation(errors)) => errors,
        Err(e) if e.is_user_facing() => vec![e.user_message()],
        Err(e) => return Err(e),
    };

    let ctx = PageContext::public(&session, "/register");
    render(RegisterTemplate {
        ctx,
        errors,
        username: registration.username,
        email: registration.email,
        full_name: registration.full_name,
    })
}

pub async fn logout(session: Session) -> Result<HttpResponse, AppError> {
    if let Ok(principal) = current_principal(&session) {
        log::info!("User '{}' logged out", principal.username);
    }
    // clear + renew rather than purge, so the flash below survives
    session.clear();
    session.renew();
    set_flash(&session, Flash::info("तुम्ही लॉग आउट झाला आहात / You have been logged out."));
    Ok(redirect("/"))
}
