//! Config defaults: the values the bot was tuned with.

use quizpilot_browser::Heuristics;

use crate::schema::{LoggingConfig, QuizPilotConfig, StorageConfig, TimingConfig};

/// Pause between coordinator cycles.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 300;

/// Delay before the first cycle after `start_bot`.
pub const DEFAULT_START_DELAY_MS: u64 = 120;

/// Wait after selecting an option.
pub const DEFAULT_SETTLE_MS: u64 = 120;

/// Wait after the corrective resubmit.
pub const DEFAULT_RESUBMIT_SETTLE_MS: u64 = 150;

/// Reveal observation window.
pub const DEFAULT_REVEAL_TIMEOUT_MS: u64 = 3000;

/// Grace period before the final reveal check.
pub const DEFAULT_REVEAL_GRACE_MS: u64 = 50;

pub use quizpilot_core::{DEFAULT_RUN_KEY, DEFAULT_STATE_KEY};

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: QuizPilotConfig) -> QuizPilotConfig {
    let config = apply_timing_defaults(config);
    let config = apply_heuristic_defaults(config);
    let config = apply_storage_defaults(config);
    apply_logging_defaults(config)
}

fn apply_timing_defaults(mut config: QuizPilotConfig) -> QuizPilotConfig {
    let timing = config.timing.get_or_insert_with(TimingConfig::default);
    timing.poll_interval_ms.get_or_insert(DEFAULT_POLL_INTERVAL_MS);
    timing.start_delay_ms.get_or_insert(DEFAULT_START_DELAY_MS);
    timing.settle_ms.get_or_insert(DEFAULT_SETTLE_MS);
    timing.resubmit_settle_ms.get_or_insert(DEFAULT_RESUBMIT_SETTLE_MS);
    timing.reveal_timeout_ms.get_or_insert(DEFAULT_REVEAL_TIMEOUT_MS);
    timing.reveal_grace_ms.get_or_insert(DEFAULT_REVEAL_GRACE_MS);
    config
}

fn apply_heuristic_defaults(mut config: QuizPilotConfig) -> QuizPilotConfig {
    config.heuristics.get_or_insert_with(Heuristics::default);
    config
}

fn apply_storage_defaults(mut config: QuizPilotConfig) -> QuizPilotConfig {
    let storage = config.storage.get_or_insert_with(StorageConfig::default);
    storage.run_key.get_or_insert_with(|| DEFAULT_RUN_KEY.to_string());
    storage.state_key.get_or_insert_with(|| DEFAULT_STATE_KEY.to_string());
    config
}

fn apply_logging_defaults(mut config: QuizPilotConfig) -> QuizPilotConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_timing() {
        let cfg = apply_all_defaults(QuizPilotConfig::default());
        let timing = cfg.timing.unwrap();
        assert_eq!(timing.poll_interval_ms, Some(300));
        assert_eq!(timing.start_delay_ms, Some(120));
        assert_eq!(timing.settle_ms, Some(120));
        assert_eq!(timing.resubmit_settle_ms, Some(150));
        assert_eq!(timing.reveal_timeout_ms, Some(3000));
        assert_eq!(timing.reveal_grace_ms, Some(50));
    }

    #[test]
    fn keeps_user_values() {
        let mut cfg = QuizPilotConfig::default();
        cfg.timing = Some(TimingConfig { poll_interval_ms: Some(1000), ..Default::default() });
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.timing.unwrap().poll_interval_ms, Some(1000));
    }

    #[test]
    fn storage_keys_match_extension() {
        let cfg = apply_all_defaults(QuizPilotConfig::default());
        let storage = cfg.storage.unwrap();
        assert_eq!(storage.run_key.as_deref(), Some("quizBotRunning"));
        assert_eq!(storage.state_key.as_deref(), Some("quizBotQStateV2"));
    }
}
