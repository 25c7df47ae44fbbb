//! Tab-scoped key/value storage.
//!
//! The host page exposes two string stores: a long-lived one that survives
//! reloads of the tab (where the run flag lives) and a session one that is
//! discarded with the tab (where per-question progress lives). Both are
//! modelled by [`TabStorage`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{QuizError, Result};

/// String key/value store with the semantics of the web storage API.
pub trait TabStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// In-process storage, one instance per scope.
///
/// Counts writes so callers can assert a code path left storage untouched.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set_item`/`remove_item` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TabStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .read()
            .map_err(|_| QuizError::Storage("storage lock poisoned".into()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .write()
            .map_err(|_| QuizError::Storage("storage lock poisoned".into()))?;
        items.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self
            .items
            .write()
            .map_err(|_| QuizError::Storage("storage lock poisoned".into()))?;
        items.remove(key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryStorage::new();
        assert_eq!(store.get_item("k").unwrap(), None);
        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v"));
        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn reads_do_not_count_as_writes() {
        let store = MemoryStorage::new();
        let _ = store.get_item("missing").unwrap();
        assert_eq!(store.write_count(), 0);
        assert!(store.is_empty());
    }
}
