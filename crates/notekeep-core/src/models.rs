//! Data models for notekeep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults::UNTITLED_NOTE;
use crate::username::Username;
use crate::uuid_utils::new_note_id;

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A stored note. One user's collection is a JSON array of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Summary view of a note for listing and mutation responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build a new note with a fresh id and both timestamps set to `now`.
    pub fn new(req: CreateNoteRequest, now: DateTime<Utc>) -> Self {
        let title = req
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED_NOTE.to_string());
        Self {
            id: new_note_id(),
            title,
            content: req.content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the provided fields and refresh `updated_at`.
    ///
    /// `updated_at` never moves before `created_at`, even if the clock does.
    pub fn apply(&mut self, req: UpdateNoteRequest, now: DateTime<Utc>) {
        if let Some(title) = req.title {
            self.title = title;
        }
        if let Some(content) = req.content {
            self.content = content;
        }
        self.updated_at = now.max(self.created_at);
    }

    pub fn summary(&self) -> NoteSummary {
        NoteSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Request for creating a new note.
#[derive(Debug, Clone, Default)]
pub struct CreateNoteRequest {
    /// Blank or absent titles become [`UNTITLED_NOTE`].
    pub title: Option<String>,
    pub content: String,
}

/// Request for updating an existing note.
///
/// Build with [`UpdateNoteRequest::new`], which drops blank fields, so a
/// `Some` here always means "apply this value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdateNoteRequest {
    pub fn new(title: Option<String>, content: Option<String>) -> Self {
        let provided = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            title: provided(title),
            content: provided(content),
        }
    }

    /// True when neither field survived normalization.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

// =============================================================================
// TOKEN TYPES
// =============================================================================

/// One entry of the token map as shown by the operator console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEntry {
    pub token: String,
    /// Stored verbatim; may fail the username policy if the file was edited by hand.
    pub username: String,
}

/// Result of replacing a user's tokens with a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub username: Username,
    /// Tokens that pointed at the same username and were removed.
    pub revoked: Vec<String>,
}
