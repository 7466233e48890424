//! Note CRUD handlers.
//!
//! Every handler takes [`RequireAuth`], so the only collection it can reach
//! is the one belonging to the token's user.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use notekeep_core::{CreateNoteRequest, Note, NoteSummary, UpdateNoteRequest};

use crate::auth::RequireAuth;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateNoteBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(v)| v).map_err(|rejection| {
        debug!(error = %rejection, "rejected request body");
        let message = format!("Invalid request body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(message)
        } else {
            ApiError::BadRequest(message)
        }
    })
}

/// `POST /api/v1/notes/create`
pub async fn create_note(
    State(state): State<AppState>,
    RequireAuth { username }: RequireAuth,
    body: Result<Json<CreateNoteBody>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteSummary>), ApiError> {
    let body = parse_body(body)?;
    let content = body
        .content
        .ok_or_else(|| ApiError::BadRequest("content is required".to_string()))?;

    let note = state
        .store
        .notes
        .insert(
            &username,
            CreateNoteRequest {
                title: body.title,
                content,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(note.summary())))
}

/// `GET /api/v1/notes/`
pub async fn list_notes(
    State(state): State<AppState>,
    RequireAuth { username }: RequireAuth,
) -> Result<Json<Vec<NoteSummary>>, ApiError> {
    let notes = state.store.notes.list(&username).await?;
    Ok(Json(notes))
}

/// `GET /api/v1/notes/:id/`
pub async fn get_note(
    State(state): State<AppState>,
    RequireAuth { username }: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let note = state.store.notes.fetch(&username, &id).await?;
    Ok(Json(note))
}

/// `PUT /api/v1/notes/:id/`
///
/// Blank fields count as absent; a body with neither field is rejected.
pub async fn update_note(
    State(state): State<AppState>,
    RequireAuth { username }: RequireAuth,
    Path(id): Path<String>,
    body: Result<Json<UpdateNoteBody>, JsonRejection>,
) -> Result<Json<NoteSummary>, ApiError> {
    let body = parse_body(body)?;
    let req = UpdateNoteRequest::new(body.title, body.content);
    let note = state.store.notes.update(&username, &id, req).await?;
    Ok(Json(note.summary()))
}

/// `DELETE /api/v1/notes/:id/`
pub async fn delete_note(
    State(state): State<AppState>,
    RequireAuth { username }: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.notes.delete(&username, &id).await?;
    Ok(Json(serde_json::json!({ "message": "Note deleted" })))
}
