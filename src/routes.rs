use actix_web::{HttpResponse, Route, dev::HttpServiceFactory, middleware::from_fn, web};

use crate::auth::middleware::require_auth;
use crate::handlers::{admin_handlers, auth_handlers, dashboard, form_handlers, upload_handlers};
use crate::models::submission::FormType;
use crate::repo::Repository;

/// Register every application route against repository `R`.
///
/// Expects `web::Data<R>`, `web::Data<UploadStore>` and
/// `web::Data<LoginThrottle>` on the app, plus session middleware.
/// Protected resources carry `require_auth` individually so paths that match
/// nothing still fall through to the app's default service.
pub fn configure<R: Repository + 'static>(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/", web::get().to(auth_handlers::index))
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit::<R>))
        .route("/register", web::get().to(auth_handlers::register_page))
        .route("/register", web::post().to(auth_handlers::register_submit::<R>))
        // Protected routes
        .service(protected("/logout", web::get().to(auth_handlers::logout)))
        .service(protected("/student_dashboard", web::get().to(dashboard::student::<R>)))
        .service(protected("/admin_dashboard", web::get().to(dashboard::admin::<R>)))
        .configure(form_routes::<R>)
        .service(protected(
            "/bonafide_certificate/{id}",
            web::get().to(form_handlers::bonafide_certificate::<R>),
        ))
        .service(protected(
            "/form_success/{form_type}/{id}",
            web::get().to(form_handlers::success::<R>),
        ))
        .service(protected("/uploads/{filename}", web::get().to(upload_handlers::serve)))
        // Admin review
        .service(protected(
            "/admin/forms/{form_type}",
            web::get().to(admin_handlers::forms_list::<R>),
        ))
        .service(protected(
            "/admin/form/{form_type}/{id}/update_status",
            web::post().to(admin_handlers::update_status::<R>),
        ));
}

fn protected(path: &'static str, route: Route) -> impl HttpServiceFactory {
    web::resource(path).route(route).wrap(from_fn(require_auth))
}

/// One resource per form type; the handler reads its `FormType` from resource data.
fn form_routes<R: Repository + 'static>(cfg: &mut web::ServiceConfig) {
    for form_type in FormType::ALL {
        cfg.service(
            web::resource(form_type.form_path())
                .app_data(web::Data::new(form_type))
                .route(web::get().to(form_handlers::show))
                .route(web::post().to(form_handlers::submit::<R>))
                .wrap(from_fn(require_auth)),
        );
    }
}

/// Default service: the static 404 page.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../templates/errors/404.html"))
}
