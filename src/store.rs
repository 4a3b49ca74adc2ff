//! Key-value persistence seam for the reload ledger.
//!
//! All durable state goes through the [`ReloadStore`] trait so the medium can
//! be swapped (SessionStorage on web, in-memory elsewhere) without touching
//! callers.

use std::cell::RefCell;
use std::collections::HashMap;

use thiserror::Error;

/// Errors surfaced by a storage medium.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No storage object is reachable in this context (e.g. a sandboxed
    /// iframe or a headless embedding).
    #[error("session storage unavailable")]
    Unavailable,
    /// The medium accepted the call but refused the operation (quota,
    /// security policy).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// String key-value store scoped to the current session.
pub trait ReloadStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// SessionStorage-backed store (WASM only).
///
/// Session scope is the point: the ledger must survive full page reloads but
/// die with the tab.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStore;

#[cfg(target_arch = "wasm32")]
impl SessionStore {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_arch = "wasm32")]
impl ReloadStore for SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let storage = crate::platform::session_storage().ok_or(StoreError::Unavailable)?;
        storage
            .get_item(key)
            .map_err(|err| StoreError::Backend(format!("{err:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = crate::platform::session_storage().ok_or(StoreError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|err| StoreError::Backend(format!("{err:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let storage = crate::platform::session_storage().ok_or(StoreError::Unavailable)?;
        storage
            .remove_item(key)
            .map_err(|err| StoreError::Backend(format!("{err:?}")))
    }
}

/// In-memory store, used on native targets and in tests.
///
/// Holds nothing durable, so on native every process starts with empty
/// history. Embeddings that render server-side can hand one shared instance
/// to several factories to get session-like behavior.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReloadStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));

        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v2".to_string()));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_memory_store_remove_absent_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("never-set").is_ok());
    }
}
