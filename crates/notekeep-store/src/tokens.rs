//! Token store backed by a single JSON object.
//!
//! The file maps token → username:
//!
//! ```json
//! { "9f3c...": "alice", "07ab...": "bob" }
//! ```
//!
//! Every mutation loads the whole map, changes it, and writes it back while
//! holding the store's mutex.

use async_trait::async_trait;
use rand::RngCore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use notekeep_core::defaults::TOKEN_BYTES;
use notekeep_core::{IssuedToken, Result, TokenEntry, TokenStore, Username};

use crate::file_storage::{read_json, write_json, StorageBackend};

type TokenMap = BTreeMap<String, String>;

/// JSON file implementation of TokenStore.
pub struct JsonTokenStore {
    backend: Arc<dyn StorageBackend>,
    path: String,
    lock: Mutex<()>,
}

impl JsonTokenStore {
    /// Create a token store reading and writing `path` on `backend`.
    pub fn new(backend: Arc<dyn StorageBackend>, path: impl Into<String>) -> Self {
        Self {
            backend,
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Generate a cryptographically secure random token.
    fn generate_token() -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    async fn load(&self) -> Result<TokenMap> {
        let (map, _) = read_json(self.backend.as_ref(), &self.path).await?;
        Ok(map)
    }

    async fn store(&self, map: &TokenMap) -> Result<()> {
        let existed = self.backend.exists(&self.path).await?;
        write_json(self.backend.as_ref(), &self.path, map).await?;
        if !existed {
            warn!(
                path = %self.path,
                "token file created; make sure its permissions are restricted on this system"
            );
        }
        Ok(())
    }

    fn insert_fresh(map: &mut TokenMap, username: &Username) -> String {
        loop {
            let token = Self::generate_token();
            if !map.contains_key(&token) {
                map.insert(token.clone(), username.to_string());
                return token;
            }
        }
    }
}

#[async_trait]
impl TokenStore for JsonTokenStore {
    async fn resolve(&self, token: &str) -> Result<Option<Username>> {
        let map = self.load().await?;
        let Some(stored) = map.get(token) else {
            return Ok(None);
        };
        match Username::parse(stored) {
            Ok(username) => Ok(Some(username)),
            Err(e) => {
                warn!(username = %stored, error = %e, "stored username fails policy; token ignored");
                Ok(None)
            }
        }
    }

    async fn issue(&self, username: &Username) -> Result<String> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        let token = Self::insert_fresh(&mut map, username);
        self.store(&map).await?;
        info!(username = %username, "token issued");
        Ok(token)
    }

    async fn revoke(&self, token: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        let Some(username) = map.remove(token) else {
            debug!("revoke: token not found");
            return Ok(false);
        };
        self.store(&map).await?;
        info!(username = %username, "token revoked");
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<TokenEntry>> {
        let map = self.load().await?;
        let mut entries: Vec<TokenEntry> = map
            .into_iter()
            .map(|(token, username)| TokenEntry { token, username })
            .collect();
        entries.sort_by(|a, b| {
            a.username
                .cmp(&b.username)
                .then_with(|| a.token.cmp(&b.token))
        });
        Ok(entries)
    }

    async fn tokens_for(&self, username: &Username) -> Result<Vec<String>> {
        let map = self.load().await?;
        Ok(map
            .into_iter()
            .filter(|(_, name)| name == username.as_str())
            .map(|(token, _)| token)
            .collect())
    }

    async fn replace(&self, username: &Username) -> Result<IssuedToken> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        let revoked: Vec<String> = map
            .iter()
            .filter(|(_, name)| name.as_str() == username.as_str())
            .map(|(token, _)| token.clone())
            .collect();
        for token in &revoked {
            map.remove(token);
        }
        let token = Self::insert_fresh(&mut map, username);
        self.store(&map).await?;
        info!(username = %username, revoked = revoked.len(), "token replaced");
        Ok(IssuedToken {
            token,
            username: username.clone(),
            revoked,
        })
    }
}
