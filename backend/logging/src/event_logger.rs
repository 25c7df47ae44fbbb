//! Cycle event records written to the `quiz_events` tracing target.

use chrono::{DateTime, Utc};
use quizpilot_core::CycleOutcome;
use serde::Serialize;
use tracing::{error, info};

/// Tracing target for cycle events; filter on it to get an answer log.
pub const EVENT_TARGET: &str = "quiz_events";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CycleEvent {
    LoopStarted,
    LoopStopped { cycles: u64 },
    Cycle { outcome: CycleOutcome },
    CycleFailed { error: String },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    pub event: CycleEvent,
}

impl EventLogEntry {
    pub fn now(event: CycleEvent) -> Self {
        Self { timestamp: Utc::now(), event }
    }
}

pub struct EventLogger;

impl EventLogger {
    pub fn log_event(event: CycleEvent) {
        let failed = matches!(event, CycleEvent::CycleFailed { .. });
        let entry = EventLogEntry::now(event);
        let json = serde_json::to_string(&entry).unwrap_or_else(|_| format!("{entry:?}"));
        if failed {
            error!(target: EVENT_TARGET, event = %json, "Quiz event");
        } else {
            info!(target: EVENT_TARGET, event = %json, "Quiz event");
        }
    }

    pub fn log_outcome(outcome: &CycleOutcome) {
        Self::log_event(CycleEvent::Cycle { outcome: outcome.clone() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_event_serializes_with_nested_outcome() {
        let event = CycleEvent::Cycle {
            outcome: CycleOutcome::Corrected { key: "42".into(), resubmitted: true, advanced: false },
        };
        let v = serde_json::to_value(&event).unwrap();
        assert_eq!(v["type"], "cycle");
        assert_eq!(v["outcome"]["outcome"], "corrected");
        assert_eq!(v["outcome"]["key"], "42");
    }

    #[test]
    fn entry_carries_timestamp() {
        let entry = EventLogEntry::now(CycleEvent::LoopStopped { cycles: 3 });
        let v = serde_json::to_value(&entry).unwrap();
        assert!(v["timestamp"].is_string());
        assert_eq!(v["event"]["cycles"], 3);
    }
}
