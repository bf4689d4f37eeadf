use actix_web::middleware::Next;
use actix_web::{
    Error, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::LOCATION,
    web::Data,
};
use tracing::debug;

use crate::auth::session::{SESSION_COOKIE, now, verify_token};
use crate::config::Config;

/// Lets requests with a valid session cookie through; everything else is
/// redirected to the login page at `/`.
pub async fn session_gate(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let authenticated = req
        .cookie(SESSION_COOKIE)
        .map(|cookie| verify_token(cookie.value(), &config.session_secret, now()))
        .unwrap_or(false);

    if !authenticated {
        debug!(path = %req.path(), "No valid session, redirecting to login");
        let resp = HttpResponse::Found()
            .insert_header((LOCATION, "/"))
            .finish();
        return Ok(req.into_response(resp.map_into_boxed_body()));
    }

    next.call(req).await
}
