use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{Either, HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::auth::credentials::credentials_match;
use crate::auth::session::{SESSION_COOKIE, create_token, now};
use crate::config::Config;
use crate::error::{ApiError, ApiResult};

/// Accepted as JSON or as an urlencoded form.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "password")]
    pub password: String,
}

type LoginBody = Either<web::Json<LoginRequest>, web::Form<LoginRequest>>;

fn session_cookie(config: &Config, value: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(Duration::seconds(config.session_ttl))
        .finish()
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body(content = LoginRequest, description = "JSON or form-encoded credentials"),
    responses(
        (status = 200, description = "Session cookie set"),
        (status = 400, description = "Username or password blank"),
        (status = 401, description = "Invalid username or password")
    ),
    tag = "Auth"
)]
pub async fn login(config: web::Data<Config>, body: Option<LoginBody>) -> ApiResult<HttpResponse> {
    let request = match body {
        Some(Either::Left(json)) => json.into_inner(),
        Some(Either::Right(form)) => form.into_inner(),
        None => LoginRequest::default(),
    };
    let username = request.username.trim();
    let password = request.password.trim();

    if username.is_empty() || password.is_empty() {
        return Err(ApiError::invalid("Username and password are required"));
    }

    if !credentials_match(&config, username, password) {
        warn!(username = %username, "Rejected login");
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let token = create_token(&config.session_secret, config.session_ttl, now())
        .ok_or_else(|| ApiError::internal("Login failed"))?;

    info!(username = %username, "Session created");
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&config, token))
        .json(json!({ "ok": true })))
}

#[utoipa::path(
    post,
    path = "/api/logout",
    responses((status = 200, description = "Session cookie cleared")),
    tag = "Auth"
)]
pub async fn logout(config: web::Data<Config>) -> HttpResponse {
    let mut cookie = session_cookie(&config, String::new());
    cookie.make_removal();
    HttpResponse::Ok().cookie(cookie).json(json!({ "ok": true }))
}
