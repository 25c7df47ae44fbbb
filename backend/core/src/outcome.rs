use serde::{Deserialize, Serialize};

/// What a single coordinator invocation ended up doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum CycleOutcome {
    /// The run flag was not set.
    NotRunning,
    /// The question key was already marked done this session.
    AlreadyDone { key: String },
    /// The panel held no visible option controls.
    NoOptions { key: String },
    /// An option was selected but no submit control was found.
    NoSubmit { key: String },
    /// No reveal appeared in time; Next was clicked and the question marked done.
    AdvancedWithoutReveal { key: String },
    /// No reveal appeared and no Next control exists; left submitted but not done.
    StalledWithoutNext { key: String },
    /// The guess matched the revealed answer.
    ConfirmedCorrect { key: String, advanced: bool },
    /// The guess was wrong; the revealed option was selected and resubmitted.
    Corrected { key: String, resubmitted: bool, advanced: bool },
}

impl CycleOutcome {
    /// Question key the cycle worked on, if it got that far.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::NotRunning => None,
            Self::AlreadyDone { key }
            | Self::NoOptions { key }
            | Self::NoSubmit { key }
            | Self::AdvancedWithoutReveal { key }
            | Self::StalledWithoutNext { key }
            | Self::ConfirmedCorrect { key, .. }
            | Self::Corrected { key, .. } => Some(key),
        }
    }

    /// True when this cycle recorded the question as done.
    pub fn finished_question(&self) -> bool {
        match self {
            Self::AdvancedWithoutReveal { .. } | Self::Corrected { .. } => true,
            Self::ConfirmedCorrect { advanced, .. } => *advanced,
            _ => false,
        }
    }
}

impl std::fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotRunning => "not_running",
            Self::AlreadyDone { .. } => "already_done",
            Self::NoOptions { .. } => "no_options",
            Self::NoSubmit { .. } => "no_submit",
            Self::AdvancedWithoutReveal { .. } => "advanced_without_reveal",
            Self::StalledWithoutNext { .. } => "stalled_without_next",
            Self::ConfirmedCorrect { .. } => "confirmed_correct",
            Self::Corrected { .. } => "corrected",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_tag() {
        let outcome = CycleOutcome::Corrected { key: "42".into(), resubmitted: true, advanced: false };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "corrected");
        assert_eq!(json["key"], "42");
        assert_eq!(outcome.to_string(), "corrected");
    }

    #[test]
    fn finished_question_tracks_done_writes() {
        assert!(!CycleOutcome::NotRunning.finished_question());
        assert!(!CycleOutcome::StalledWithoutNext { key: "1".into() }.finished_question());
        assert!(CycleOutcome::AdvancedWithoutReveal { key: "1".into() }.finished_question());
        assert!(!CycleOutcome::ConfirmedCorrect { key: "1".into(), advanced: false }.finished_question());
        assert!(CycleOutcome::Corrected { key: "1".into(), resubmitted: false, advanced: false }
            .finished_question());
    }
}
