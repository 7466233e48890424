//! Core traits for notekeep abstractions.
//!
//! These traits define the interfaces that concrete stores must satisfy.
//! The HTTP handlers and the operator console only ever see these traits,
//! so tests can substitute in-memory implementations.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;
use crate::username::Username;

// =============================================================================
// TOKEN STORE
// =============================================================================

/// Mapping of bearer tokens to usernames.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Look up the username a token grants access to.
    async fn resolve(&self, token: &str) -> Result<Option<Username>>;

    /// Mint a new token for `username` without touching existing ones.
    async fn issue(&self, username: &Username) -> Result<String>;

    /// Remove a token. Returns whether it existed.
    async fn revoke(&self, token: &str) -> Result<bool>;

    /// All token entries, ordered by username then token.
    async fn list(&self) -> Result<Vec<TokenEntry>>;

    /// Tokens currently pointing at `username`.
    async fn tokens_for(&self, username: &Username) -> Result<Vec<String>>;

    /// Revoke every token of `username` and issue a new one atomically.
    async fn replace(&self, username: &Username) -> Result<IssuedToken>;
}

// =============================================================================
// NOTE STORE
// =============================================================================

/// Per-user note collections.
///
/// `load`/`save` operate on whole collections. The remaining operations are
/// read-modify-write cycles that implementations must serialize per user.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Load a user's collection; empty if none has been stored.
    async fn load(&self, username: &Username) -> Result<Vec<Note>>;

    /// Overwrite a user's collection.
    async fn save(&self, username: &Username, notes: &[Note]) -> Result<()>;

    /// Check whether a collection has been stored for the user.
    async fn exists(&self, username: &Username) -> Result<bool>;

    /// Create an empty collection unless one already exists.
    async fn ensure(&self, username: &Username) -> Result<()>;

    /// Append a new note.
    async fn insert(&self, username: &Username, req: CreateNoteRequest) -> Result<Note>;

    /// Summaries of every note in stored order.
    async fn list(&self, username: &Username) -> Result<Vec<NoteSummary>>;

    /// Fetch a full note by exact id.
    async fn fetch(&self, username: &Username, id: &str) -> Result<Note>;

    /// Apply an update to the first note matching `id`.
    async fn update(
        &self,
        username: &Username,
        id: &str,
        req: UpdateNoteRequest,
    ) -> Result<Note>;

    /// Remove the first note matching `id`.
    async fn delete(&self, username: &Username, id: &str) -> Result<()>;
}
