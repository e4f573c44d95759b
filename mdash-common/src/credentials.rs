//! Bearer-token persistence
//!
//! The dashboard keeps the token returned by `POST /auth/login` in local
//! storage and attaches it to every request. Clearing the store is how a
//! session ends, whether by explicit logout or by a 401 from the backend.

use crate::config::write_atomic;
use crate::models::UserProfile;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// A stored session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
    pub saved_at: DateTime<Utc>,
}

impl Credentials {
    pub fn new(token: impl Into<String>, user: Option<UserProfile>) -> Self {
        Self {
            token: token.into(),
            user,
            saved_at: crate::time::now(),
        }
    }
}

/// Local persistent storage for the session token
pub trait CredentialStore: Send + Sync {
    /// Current credentials, or `None` when logged out
    fn load(&self) -> Result<Option<Credentials>>;

    fn save(&self, credentials: &Credentials) -> Result<()>;

    /// Forget the session. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

/// Credentials kept in a JSON file (0600 on Unix)
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let credentials = serde_json::from_str(&content).map_err(|e| {
            Error::Credentials(format!("{} is corrupt: {}", self.path.display(), e))
        })?;
        Ok(Some(credentials))
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        let json = serde_json::to_vec_pretty(credentials)
            .map_err(|e| Error::Credentials(e.to_string()))?;
        write_atomic(&self.path, &json)?;
        debug!(path = %self.path.display(), "Saved credentials");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Removed credentials");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Some(Credentials::new(token, None))),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| Error::Credentials("store lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| Error::Credentials("store lock poisoned".to_string()))?;
        *guard = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| Error::Credentials("store lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}
