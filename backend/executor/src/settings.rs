use std::time::Duration;

use quizpilot_browser::Heuristics;
use quizpilot_config::QuizPilotConfig;

/// Timings and heuristics one coordinator runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorSettings {
    /// Pause after selecting an option.
    pub settle: Duration,
    /// Pause after the corrective resubmit.
    pub resubmit_settle: Duration,
    pub reveal_timeout: Duration,
    pub reveal_grace: Duration,
    pub heuristics: Heuristics,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self::from_config(&QuizPilotConfig::default())
    }
}

impl CoordinatorSettings {
    pub fn from_config(config: &QuizPilotConfig) -> Self {
        let timing = config.timing();
        Self {
            settle: timing.settle(),
            resubmit_settle: timing.resubmit_settle(),
            reveal_timeout: timing.reveal_timeout(),
            reveal_grace: timing.reveal_grace(),
            heuristics: config.heuristics(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizpilot_config::TimingConfig;

    #[test]
    fn defaults_match_tuned_timings() {
        let s = CoordinatorSettings::default();
        assert_eq!(s.settle, Duration::from_millis(120));
        assert_eq!(s.resubmit_settle, Duration::from_millis(150));
        assert_eq!(s.reveal_timeout, Duration::from_millis(3000));
        assert_eq!(s.reveal_grace, Duration::from_millis(50));
    }

    #[test]
    fn config_overrides_apply() {
        let mut cfg = QuizPilotConfig::default();
        cfg.timing = Some(TimingConfig { reveal_timeout_ms: Some(500), ..Default::default() });
        let s = CoordinatorSettings::from_config(&cfg);
        assert_eq!(s.reveal_timeout, Duration::from_millis(500));
        assert_eq!(s.settle, Duration::from_millis(120));
    }
}
