//! # notekeep-store
//!
//! JSON file storage layer for notekeep.
//!
//! This crate provides:
//! - Storage backends (filesystem with atomic writes, in-memory for tests)
//! - A token store over a single JSON object
//! - A note store over one JSON array per user, with per-user locking
//!
//! ## Example
//!
//! ```rust,ignore
//! use notekeep_store::{Store, CreateNoteRequest, Username};
//!
//! let store = Store::open("data", "tokens.json").await?;
//! let alice = Username::parse("alice")?;
//! let token = store.tokens.issue(&alice).await?;
//! store.notes.insert(&alice, CreateNoteRequest {
//!     title: Some("Groceries".into()),
//!     content: "milk, eggs".into(),
//! }).await?;
//! ```

pub mod file_storage;
mod locks;
pub mod notes;
pub mod tokens;

use std::path::Path;
use std::sync::Arc;

// Re-export core types
pub use notekeep_core::*;

pub use file_storage::{FilesystemBackend, MemoryBackend, StorageBackend};
pub use notes::JsonNoteStore;
pub use tokens::JsonTokenStore;

/// Combined storage context shared by the HTTP server and the console.
///
/// Cloning is cheap and every clone addresses the same stores, so locks taken
/// through one clone are honoured by all others.
#[derive(Clone)]
pub struct Store {
    /// Token → username mapping.
    pub tokens: Arc<dyn TokenStore>,
    /// Per-user note collections.
    pub notes: Arc<dyn NoteStore>,
}

impl Store {
    /// Build a store from explicit implementations.
    pub fn new(tokens: Arc<dyn TokenStore>, notes: Arc<dyn NoteStore>) -> Self {
        Self { tokens, notes }
    }

    /// Build JSON stores sharing one backend.
    pub fn with_backend(backend: Arc<dyn StorageBackend>, tokens_path: &str) -> Self {
        Self {
            tokens: Arc::new(JsonTokenStore::new(backend.clone(), tokens_path)),
            notes: Arc::new(JsonNoteStore::new(backend)),
        }
    }

    /// Open the filesystem store rooted at `data_dir`, validating that the
    /// directory is writable.
    pub async fn open(data_dir: impl AsRef<Path>, tokens_path: &str) -> Result<Self> {
        let backend = FilesystemBackend::new(data_dir.as_ref());
        backend.validate().await.map_err(|e| {
            Error::Config(format!(
                "data directory {} is not usable: {}",
                data_dir.as_ref().display(),
                e
            ))
        })?;
        Ok(Self::with_backend(Arc::new(backend), tokens_path))
    }

    /// In-memory store for tests.
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()), defaults::TOKENS_FILE)
    }
}
