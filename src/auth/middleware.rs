use actix_session::SessionExt;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::Method,
    middleware::Next,
};

use crate::auth::session::{current_principal, safe_next};

/// Resolve the logged-in [`Principal`](crate::auth::session::Principal) from
/// the session and attach it to the request for handlers to extract.
/// Requests without one are redirected to /login, with `?next=` pointing
/// back at the page for plain GETs.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let principal = current_principal(&req.get_session());

    match principal {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.call(req).await.map(|res| res.map_into_left_body())
        }
        Err(_) => {
            log::debug!("Unauthenticated request to {}, redirecting to login", req.path());
            let location = match safe_next(req.path()) {
                Some(path) if req.method() == Method::GET => format!("/login?next={path}"),
                _ => "/login".to_string(),
            };
            let response = HttpResponse::SeeOther()
                .insert_header(("Location", location))
                .finish();
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}
