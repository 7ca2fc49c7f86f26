//! Local persistent key-value store.
//!
//! The browser-localStorage analog backing the auth flow. One JSON file maps
//! string keys to string values; every read loads the whole file and every
//! write rewrites it. Multiple processes sharing the file are not coordinated:
//! last writer wins.
//!
//! ## Keys
//!
//! - `autorithm_user` - current session projection, JSON-encoded
//! - `autorithm_users` - array of user records, JSON-encoded
//! - `reset_token_<email>` - bare reset token string

pub mod users;

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

/// Well-known store keys.
pub mod keys {
    /// Current session projection (JSON-encoded `CurrentUser`).
    pub const USER: &str = "autorithm_user";

    /// All registered user records (JSON-encoded array).
    pub const USERS: &str = "autorithm_users";

    /// Reset token key for an email. At most one token exists per email;
    /// a new request overwrites the prior one.
    #[must_use]
    pub fn reset_token(email: &str) -> String {
        format!("reset_token_{email}")
    }
}

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file I/O failed.
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be decoded.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The referenced record does not exist.
    #[error("not found")]
    NotFound,
}

/// File-backed key-value store.
///
/// Values are opaque strings; callers decide their encoding. The store file
/// is created lazily on first write.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Create a store over the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the store file cannot be read, or
    /// `StoreError::DataCorruption` if the file itself is not valid JSON.
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    /// Set `key` to `value`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the store file cannot be written.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write_all(&entries)
    }

    /// Remove `key` from the store. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the store file cannot be written.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }

    /// Read the full key-value map. A missing file is an empty store.
    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        serde_json::from_str(&raw)
            .map_err(|e| StoreError::DataCorruption(format!("invalid store file: {e}")))
    }

    /// Rewrite the store file with the full key-value map.
    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::DataCorruption(format!("failed to encode store: {e}")))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}
