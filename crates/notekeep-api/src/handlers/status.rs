//! Liveness and token check endpoints.

use axum::Json;
use serde::Serialize;

use notekeep_core::defaults::LIVENESS_MESSAGE;

use crate::auth::Auth;

pub const STATUS_AUTHENTICATED: &str = "ok_authenticated";
pub const STATUS_UNAUTHENTICATED: &str = "ok_unauthenticated";

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
    pub status: &'static str,
}

/// `GET /`
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// `GET /api/v1/status`
///
/// Always 200. Clients use it to check a token without touching notes.
pub async fn status(auth: Auth) -> Json<StatusResponse> {
    let response = match auth.username {
        Some(_) => StatusResponse {
            message: "Access granted",
            status: STATUS_AUTHENTICATED,
        },
        None => StatusResponse {
            message: "Server running",
            status: STATUS_UNAUTHENTICATED,
        },
    };
    Json(response)
}
