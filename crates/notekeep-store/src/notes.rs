//! Note store backed by one JSON array per user.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use notekeep_core::defaults::NOTES_FILE;
use notekeep_core::{
    CreateNoteRequest, Error, Note, NoteStore, NoteSummary, Result, UpdateNoteRequest, Username,
};

use crate::file_storage::{read_json, write_json, StorageBackend};
use crate::locks::KeyedLocks;

/// JSON file implementation of NoteStore.
///
/// A user's collection lives at `<username>/notes.json` on the backend.
/// Read-modify-write cycles hold that user's lock.
pub struct JsonNoteStore {
    backend: Arc<dyn StorageBackend>,
    locks: KeyedLocks,
}

impl JsonNoteStore {
    /// Create a note store on top of `backend`.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            locks: KeyedLocks::new(),
        }
    }

    /// Backend path of a user's collection.
    pub fn collection_path(username: &Username) -> String {
        format!("{}/{}", username.as_str(), NOTES_FILE)
    }

    async fn read(&self, username: &Username) -> Result<(Vec<Note>, bool)> {
        read_json(self.backend.as_ref(), &Self::collection_path(username)).await
    }

    async fn write(&self, username: &Username, notes: &[Note]) -> Result<()> {
        write_json(self.backend.as_ref(), &Self::collection_path(username), notes).await
    }

    fn not_found(id: &str) -> Error {
        Error::NotFound(format!("Note {id} not found"))
    }
}

#[async_trait]
impl NoteStore for JsonNoteStore {
    async fn load(&self, username: &Username) -> Result<Vec<Note>> {
        Ok(self.read(username).await?.0)
    }

    async fn save(&self, username: &Username, notes: &[Note]) -> Result<()> {
        let mut seen = HashSet::with_capacity(notes.len());
        if let Some(dup) = notes.iter().find(|n| !seen.insert(n.id.as_str())) {
            return Err(Error::InvalidInput(format!(
                "duplicate note id {} in collection",
                dup.id
            )));
        }

        let _guard = self.locks.lock(username).await;
        self.write(username, notes).await?;
        debug!(username = %username, count = notes.len(), "notes collection saved");
        Ok(())
    }

    async fn exists(&self, username: &Username) -> Result<bool> {
        self.backend
            .exists(&Self::collection_path(username))
            .await
    }

    async fn ensure(&self, username: &Username) -> Result<()> {
        let _guard = self.locks.lock(username).await;
        if self.exists(username).await? {
            return Ok(());
        }
        self.write(username, &[]).await?;
        info!(username = %username, "notes collection created");
        Ok(())
    }

    async fn insert(&self, username: &Username, req: CreateNoteRequest) -> Result<Note> {
        let _guard = self.locks.lock(username).await;
        let (mut notes, _) = self.read(username).await?;

        let mut note = Note::new(req, Utc::now());
        while notes.iter().any(|n| n.id == note.id) {
            note.id = notekeep_core::new_note_id();
        }
        notes.push(note.clone());

        self.write(username, &notes).await?;
        debug!(username = %username, note_id = %note.id, "note created");
        Ok(note)
    }

    async fn list(&self, username: &Username) -> Result<Vec<NoteSummary>> {
        let notes = self.load(username).await?;
        Ok(notes.iter().map(Note::summary).collect())
    }

    async fn fetch(&self, username: &Username, id: &str) -> Result<Note> {
        self.load(username)
            .await?
            .into_iter()
            .find(|n| n.id == id)
            .ok_or_else(|| Self::not_found(id))
    }

    async fn update(
        &self,
        username: &Username,
        id: &str,
        req: UpdateNoteRequest,
    ) -> Result<Note> {
        if req.is_empty() {
            return Err(Error::InvalidInput(
                "title or content is required".to_string(),
            ));
        }

        let _guard = self.locks.lock(username).await;
        let (mut notes, _) = self.read(username).await?;
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        note.apply(req, Utc::now());
        let updated = note.clone();

        self.write(username, &notes).await?;
        debug!(username = %username, note_id = %id, "note updated");
        Ok(updated)
    }

    async fn delete(&self, username: &Username, id: &str) -> Result<()> {
        let _guard = self.locks.lock(username).await;
        let (mut notes, _) = self.read(username).await?;
        let index = notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        notes.remove(index);

        self.write(username, &notes).await?;
        debug!(username = %username, note_id = %id, "note deleted");
        Ok(())
    }
}
