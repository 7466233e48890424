//! HTTP error responses.
//!
//! Every failure leaves the API as `{"error": message}` with a matching
//! status code. Internal failures are logged here and replaced by a generic
//! message so storage paths and I/O details never reach clients.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    PayloadTooLarge(String),
    Internal(notekeep_core::Error),
}

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

impl From<notekeep_core::Error> for ApiError {
    fn from(err: notekeep_core::Error) -> Self {
        use notekeep_core::Error;
        match err {
            Error::Unauthenticated(msg) => ApiError::Unauthorized(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::InvalidUsername(e) => ApiError::BadRequest(e.to_string()),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(err) => {
                error!(error = %err, "request failed with internal error");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            ApiError::Unauthorized(msg) => {
                let body = Json(serde_json::json!({ "error": msg }));
                return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
            }
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::PayloadTooLarge(msg) => msg,
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
