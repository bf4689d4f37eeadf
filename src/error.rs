use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use std::fmt;
use tracing::error;

/// Errors surfaced by the dashboard handlers.
///
/// The message of every variant is what the client sees in the `{"error": ...}`
/// body, so `Internal` only ever carries a generic, endpoint-level message.
#[derive(Debug, Display, PartialEq)]
pub enum ApiError {
    /// A required filter (usually `from`/`to`) is absent.
    #[display(fmt = "{}", _0)]
    MissingParameter(String),

    /// A filter is present but malformed or out of range.
    #[display(fmt = "{}", _0)]
    InvalidParameter(String),

    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    #[display(fmt = "{}", _0)]
    Internal(String),
}

impl ApiError {
    pub fn missing(message: impl Into<String>) -> Self {
        ApiError::MissingParameter(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidParameter(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter(_) | ApiError::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

/// Logs a failure and turns it into the endpoint's generic 500.
///
/// Used as `.map_err(server_error("Failed to load companies"))`.
pub fn server_error<E: fmt::Display>(message: &'static str) -> impl FnOnce(E) -> ApiError {
    move |e| {
        error!(error = %e, "{}", message);
        ApiError::internal(message)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
