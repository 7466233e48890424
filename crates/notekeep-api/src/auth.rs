//! Bearer-token authentication extractors.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use tracing::{debug, warn};

use notekeep_core::{Error, Username};

use crate::error::ApiError;
use crate::AppState;

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// Returns `None` when the header is absent, not valid ASCII, uses another
/// scheme, or carries an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<Username>, ApiError> {
    let Some(token) = bearer_token(&parts.headers) else {
        return Ok(None);
    };
    Ok(state.store.tokens.resolve(token).await?)
}

/// Extractor for optionally authenticated requests.
///
/// Never rejects: a missing or unknown token yields `username: None`.
#[derive(Debug, Clone)]
pub struct Auth {
    pub username: Option<Username>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let username = resolve(parts, state).await.unwrap_or_else(|e| {
            warn!(error = ?e, "token lookup failed; treating request as unauthenticated");
            None
        });
        Ok(Auth { username })
    }
}

/// Extractor that requires a valid bearer token.
///
/// Handlers taking this only ever see the resolved user's collection.
#[derive(Debug, Clone)]
pub struct RequireAuth {
    pub username: Username,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if bearer_token(&parts.headers).is_none() {
            debug!("missing or malformed Authorization header");
            let message = "Missing or malformed bearer token".to_string();
            return Err(Error::Unauthenticated(message).into());
        }

        match resolve(parts, state).await? {
            Some(username) => Ok(RequireAuth { username }),
            None => Err(Error::Unauthenticated("Invalid token".to_string()).into()),
        }
    }
}
