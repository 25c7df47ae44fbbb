//! The run flag: a `"true"`/`"false"` string in tab-scoped storage that
//! decides whether the polling loop keeps going.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::TabStorage;

/// Tab storage key holding the run flag.
pub const DEFAULT_RUN_KEY: &str = "quizBotRunning";

/// Handle to the persisted run flag.
///
/// Cheap to clone; all clones observe the same storage.
#[derive(Clone)]
pub struct RunFlag {
    storage: Arc<dyn TabStorage>,
    key: String,
}

impl RunFlag {
    pub fn new(storage: Arc<dyn TabStorage>) -> Self {
        Self::with_key(storage, DEFAULT_RUN_KEY)
    }

    pub fn with_key(storage: Arc<dyn TabStorage>, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    /// True only when storage holds exactly `"true"`. Read failures count as stopped.
    pub fn is_running(&self) -> bool {
        match self.storage.get_item(&self.key) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!(error = %e, "Failed to read run flag; treating as stopped");
                false
            }
        }
    }

    pub fn set_running(&self, running: bool) -> Result<()> {
        let value = if running { "true" } else { "false" };
        debug!(key = %self.key, value, "Setting run flag");
        self.storage.set_item(&self.key, value)
    }
}

impl std::fmt::Debug for RunFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunFlag")
            .field("key", &self.key)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuizError;
    use crate::storage::MemoryStorage;

    #[test]
    fn absent_flag_is_stopped() {
        let flag = RunFlag::new(Arc::new(MemoryStorage::new()));
        assert!(!flag.is_running());
    }

    #[test]
    fn toggles_through_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let flag = RunFlag::new(storage.clone());
        flag.set_running(true).unwrap();
        assert_eq!(storage.get_item(DEFAULT_RUN_KEY).unwrap().as_deref(), Some("true"));
        assert!(flag.clone().is_running());
        flag.set_running(false).unwrap();
        assert_eq!(storage.get_item(DEFAULT_RUN_KEY).unwrap().as_deref(), Some("false"));
        assert!(!flag.is_running());
    }

    struct ReadOnlyStorage;

    impl TabStorage for ReadOnlyStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Err(QuizError::Storage("quota exceeded".into()))
        }
        fn remove_item(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_reported() {
        let flag = RunFlag::new(Arc::new(ReadOnlyStorage));
        assert!(matches!(flag.set_running(true), Err(QuizError::Storage(_))));
        assert!(!flag.is_running());
    }

    #[test]
    fn only_exact_true_counts() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(DEFAULT_RUN_KEY, "TRUE").unwrap();
        assert!(!RunFlag::new(storage).is_running());
    }
}
