//! Per-question progress, persisted as one JSON object in session storage.
//!
//! Entries move `absent -> submitted -> done` and never go back. Keys are
//! never pruned; the whole map is dropped when the bot is started.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::TabStorage;

/// Session storage key holding the question-state map.
pub const DEFAULT_STATE_KEY: &str = "quizBotQStateV2";

/// Progress recorded for a single question key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default)]
    pub submitted: bool,
    #[serde(default)]
    pub done: bool,
}

pub type QuestionStateMap = HashMap<String, QuestionRecord>;

/// Reads and writes the question-state map.
#[derive(Clone)]
pub struct QuestionStateStore {
    storage: Arc<dyn TabStorage>,
    key: String,
}

impl QuestionStateStore {
    pub fn new(storage: Arc<dyn TabStorage>) -> Self {
        Self::with_key(storage, DEFAULT_STATE_KEY)
    }

    pub fn with_key(storage: Arc<dyn TabStorage>, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    /// Load the full map. Missing or unparsable state decodes as empty.
    pub fn load(&self) -> QuestionStateMap {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return QuestionStateMap::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read question state");
                return QuestionStateMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "Discarding corrupt question state");
                QuestionStateMap::new()
            }
        }
    }

    pub fn save(&self, map: &QuestionStateMap) -> Result<()> {
        let raw = serde_json::to_string(map)?;
        self.storage.set_item(&self.key, &raw)
    }

    pub fn get(&self, question_key: &str) -> Option<QuestionRecord> {
        self.load().get(question_key).copied()
    }

    pub fn is_done(&self, question_key: &str) -> bool {
        self.get(question_key).map(|r| r.done).unwrap_or(false)
    }

    /// Record that the first submission for `question_key` was clicked.
    pub fn mark_submitted(&self, question_key: &str) -> Result<()> {
        let mut map = self.load();
        map.entry(question_key.to_string()).or_default().submitted = true;
        debug!(question = %question_key, "Marked submitted");
        self.save(&map)
    }

    /// Record that `question_key` is finished for the rest of the session.
    pub fn mark_done(&self, question_key: &str) -> Result<()> {
        let mut map = self.load();
        let record = map.entry(question_key.to_string()).or_default();
        record.submitted = true;
        record.done = true;
        debug!(question = %question_key, "Marked done");
        self.save(&map)
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove_item(&self.key)
    }
}

impl std::fmt::Debug for QuestionStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionStateStore").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> (Arc<MemoryStorage>, QuestionStateStore) {
        let storage = Arc::new(MemoryStorage::new());
        (storage.clone(), QuestionStateStore::new(storage))
    }

    #[test]
    fn transitions_are_monotonic() {
        let (_, store) = store();
        assert_eq!(store.get("q1"), None);
        store.mark_submitted("q1").unwrap();
        assert_eq!(store.get("q1"), Some(QuestionRecord { submitted: true, done: false }));
        store.mark_done("q1").unwrap();
        store.mark_submitted("q1").unwrap();
        assert_eq!(store.get("q1"), Some(QuestionRecord { submitted: true, done: true }));
        assert!(store.is_done("q1"));
    }

    #[test]
    fn corrupt_state_reads_as_empty() {
        let (storage, store) = store();
        storage.set_item(DEFAULT_STATE_KEY, "{not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn accepts_partial_records() {
        let (storage, store) = store();
        storage.set_item(DEFAULT_STATE_KEY, r#"{"123":{"submitted":true}}"#).unwrap();
        assert_eq!(store.get("123"), Some(QuestionRecord { submitted: true, done: false }));
    }

    #[test]
    fn clear_drops_everything() {
        let (storage, store) = store();
        store.mark_done("a").unwrap();
        store.clear().unwrap();
        assert!(store.load().is_empty());
        assert_eq!(storage.get_item(DEFAULT_STATE_KEY).unwrap(), None);
    }
}
