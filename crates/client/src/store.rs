//! Local key-value store for client-held state.
//!
//! The browser original kept tokens and saved items in ad-hoc `localStorage`
//! keys mutated from several scripts at once. Here all locally persisted
//! state goes through one typed store: a JSON file rewritten atomically on
//! every mutation, or a purely in-memory map for tests and throwaway
//! sessions.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur reading or writing the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored state could not be encoded.
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Well-known keys in the local store.
pub mod keys {
    /// Key for the access token.
    pub const ACCESS_TOKEN: &str = "session.access";

    /// Key for the refresh token.
    pub const REFRESH_TOKEN: &str = "session.refresh";

    /// Key for the CSRF token (csrf-cookie auth mode).
    pub const CSRF_TOKEN: &str = "session.csrf";

    /// Key for the saved-for-later wishlist entries.
    pub const SAVED_ITEMS: &str = "wishlist.saved";

    /// Key for a checkout attempt that has not reached a terminal state.
    pub const PENDING_CHECKOUT: &str = "checkout.pending";
}

/// File-backed JSON key-value store.
///
/// Cheaply cloneable; clones share the same underlying map and file.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<RwLock<StoreInner>>,
}

struct StoreInner {
    values: BTreeMap<String, serde_json::Value>,
    /// Backing file; `None` for in-memory stores.
    path: Option<PathBuf>,
}

impl LocalStore {
    /// Open a store backed by the given file, loading existing contents.
    ///
    /// A missing file is treated as an empty store; parent directories are
    /// created so the first write succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file exists but cannot be read, or
    /// the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(values) => values,
                Err(e) => {
                    // A corrupt state file is recoverable: start empty and
                    // let the next write replace it.
                    warn!(path = %path.display(), error = %e, "Discarding unreadable state file");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(StoreInner {
                values,
                path: Some(path),
            })),
        })
    }

    /// Create a store with no backing file.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                values: BTreeMap::new(),
                path: None,
            })),
        }
    }

    /// Get a typed value by key.
    ///
    /// Returns `None` when the key is absent or the stored value no longer
    /// decodes as `T` (logged, treated as absent).
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let inner = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let value = inner.values.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "Stored value failed to decode");
                None
            }
        }
    }

    /// Set a typed value, persisting the whole store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the value cannot be encoded or the file
    /// cannot be written.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let encoded = serde_json::to_value(value)?;
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.values.insert(key.to_string(), encoded);
        Self::persist(&inner)
    }

    /// Remove a key, persisting the whole store. Removing an absent key is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be written.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if inner.values.remove(key).is_none() {
            return Ok(());
        }
        Self::persist(&inner)
    }

    /// Write the current map to the backing file, if any.
    ///
    /// Writes to a sibling temp file then renames, so a crash mid-write
    /// never leaves a truncated state file.
    fn persist(inner: &StoreInner) -> Result<(), StoreError> {
        let Some(path) = &inner.path else {
            return Ok(());
        };

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&inner.values)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip() {
        let store = LocalStore::in_memory();
        store.set("k", &"value".to_string()).expect("set");
        assert_eq!(store.get::<String>("k"), Some("value".to_string()));

        store.remove("k").expect("remove");
        assert_eq!(store.get::<String>("k"), None);
    }

    #[test]
    fn test_get_absent_key() {
        let store = LocalStore::in_memory();
        assert_eq!(store.get::<u32>("missing"), None);
    }

    #[test]
    fn test_get_wrong_type_treated_as_absent() {
        let store = LocalStore::in_memory();
        store.set("k", &"not a number".to_string()).expect("set");
        assert_eq!(store.get::<u32>("k"), None);
    }

    #[test]
    fn test_clones_share_state() {
        let store = LocalStore::in_memory();
        let clone = store.clone();
        store.set("k", &1_u32).expect("set");
        assert_eq!(clone.get::<u32>("k"), Some(1));
    }

    #[test]
    fn test_file_persistence_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");

        let store = LocalStore::open(&path).expect("open");
        store.set("k", &vec![1_u32, 2, 3]).expect("set");
        drop(store);

        let reopened = LocalStore::open(&path).expect("reopen");
        assert_eq!(reopened.get::<Vec<u32>>("k"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").expect("write");

        let store = LocalStore::open(&path).expect("open");
        assert_eq!(store.get::<String>("k"), None);

        // And the next write replaces the corrupt file
        store.set("k", &"v".to_string()).expect("set");
        let reopened = LocalStore::open(&path).expect("reopen");
        assert_eq!(reopened.get::<String>("k"), Some("v".to_string()));
    }

    #[test]
    fn test_missing_parent_dir_created() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("state.json");

        let store = LocalStore::open(&path).expect("open");
        store.set("k", &true).expect("set");
        assert!(path.exists());
    }
}
