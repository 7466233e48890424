//! Byte-level storage backends.
//!
//! Stores address their data by a relative path such as `tokens.json` or
//! `alice/notes.json`. A backend maps those paths onto real storage:
//! - [`FilesystemBackend`] writes files under a base directory, atomically
//! - [`MemoryBackend`] keeps everything in a map, for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use notekeep_store::file_storage::{FilesystemBackend, StorageBackend};
//!
//! let backend = FilesystemBackend::new("/var/lib/notekeep");
//! backend.write("alice/notes.json", b"[]").await?;
//! assert_eq!(backend.read("alice/notes.json").await?, Some(b"[]".to_vec()));
//! ```

use async_trait::async_trait;
use notekeep_core::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Storage backend trait for different storage implementations.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data to the specified path, replacing anything stored there.
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Read data from the specified path, `None` if nothing is stored.
    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Delete data at the specified path. Missing paths are not an error.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Check if data exists at the specified path.
    async fn exists(&self, path: &str) -> Result<bool>;
}

/// Filesystem storage backend.
///
/// Paths are joined onto `base_path`. Parent directories are created on
/// demand, so `alice/notes.json` creates the `alice` directory.
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given base directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    /// Validate that the storage backend can write, read, and delete files.
    ///
    /// Performs a full round-trip test at startup to catch permission errors
    /// and missing directories early.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join(".health-check");
        let test_file = test_dir.join("test.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await; // Best-effort cleanup

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);
        debug!(storage_path = %path, full_path = %full_path.display(), size = data.len(), "file_storage: write");

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "file_storage: create_dir_all failed");
                e
            })?;
        }

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "file_storage: File::create failed");
            e
        })?;
        file.write_all(data).await.map_err(|e| {
            warn!(error = %e, "file_storage: write_all failed");
            e
        })?;
        file.sync_all().await?;
        drop(file);

        // Tokens and notes are private to the operator: rw-------
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        fs::rename(&temp_path, &full_path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %full_path.display(), error = %e, "file_storage: rename failed");
            e
        })?;

        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.full_path(path)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<()> {
        match fs::remove_file(self.full_path(path)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = self.full_path(path);
        Ok(fs::try_exists(full_path).await?)
    }
}

/// In-memory storage backend.
#[derive(Default)]
pub struct MemoryBackend {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        self.files
            .lock()
            .await
            .insert(path.to_string(), data.to_vec());
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.files.lock().await.get(path).cloned())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.files.lock().await.remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.files.lock().await.contains_key(path))
    }
}

/// Read and parse a JSON document.
///
/// Missing and unparseable documents both come back as `T::default()`; the
/// next write replaces a corrupt file. The flag reports whether anything was
/// stored at all.
pub async fn read_json<T>(backend: &dyn StorageBackend, path: &str) -> Result<(T, bool)>
where
    T: DeserializeOwned + Default,
{
    let Some(bytes) = backend.read(path).await? else {
        return Ok((T::default(), false));
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok((value, true)),
        Err(e) => {
            debug!(storage_path = %path, error = %e, "file_storage: unparseable JSON treated as empty");
            Ok((T::default(), true))
        }
    }
}

/// Serialize `value` as pretty JSON and write it.
pub async fn write_json<T>(backend: &dyn StorageBackend, path: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec_pretty(value)?;
    backend.write(path, &bytes).await
}
