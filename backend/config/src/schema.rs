//! QuizPilot configuration schema.
//!
//! Every section is optional in the file; [`crate::apply_all_defaults`]
//! fills in anything left out.

use std::time::Duration;

use quizpilot_browser::Heuristics;
use serde::{Deserialize, Serialize};

use crate::defaults::*;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPilotConfig {
    /// Loop, settle and reveal timings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingConfig>,

    /// Word lists and thresholds for the page heuristics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heuristics: Option<Heuristics>,

    /// Tab storage keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

impl QuizPilotConfig {
    pub fn timing(&self) -> TimingConfig {
        self.timing.clone().unwrap_or_default()
    }

    pub fn heuristics(&self) -> Heuristics {
        self.heuristics.clone().unwrap_or_default()
    }

    pub fn storage(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// All durations in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingConfig {
    /// Pause between coordinator cycles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
    /// Delay between `start_bot` and the first cycle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_delay_ms: Option<u64>,
    /// Wait after selecting an option
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_ms: Option<u64>,
    /// Wait after the corrective resubmit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resubmit_settle_ms: Option<u64>,
    /// How long to watch for the correct-answer reveal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reveal_timeout_ms: Option<u64>,
    /// Extra time before the final reveal check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reveal_grace_ms: Option<u64>,
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms.unwrap_or(DEFAULT_START_DELAY_MS))
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms.unwrap_or(DEFAULT_SETTLE_MS))
    }

    pub fn resubmit_settle(&self) -> Duration {
        Duration::from_millis(self.resubmit_settle_ms.unwrap_or(DEFAULT_RESUBMIT_SETTLE_MS))
    }

    pub fn reveal_timeout(&self) -> Duration {
        Duration::from_millis(self.reveal_timeout_ms.unwrap_or(DEFAULT_REVEAL_TIMEOUT_MS))
    }

    pub fn reveal_grace(&self) -> Duration {
        Duration::from_millis(self.reveal_grace_ms.unwrap_or(DEFAULT_REVEAL_GRACE_MS))
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// Tab storage key of the run flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_key: Option<String>,
    /// Session storage key of the question-state map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_key: Option<String>,
}

impl StorageConfig {
    pub fn run_key(&self) -> &str {
        self.run_key.as_deref().unwrap_or(DEFAULT_RUN_KEY)
    }

    pub fn state_key(&self) -> &str {
        self.state_key.as_deref().unwrap_or(DEFAULT_STATE_KEY)
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Emit JSON lines on the console instead of human-readable output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
    /// Directory for daily-rotated NDJSON logs; no file output when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
