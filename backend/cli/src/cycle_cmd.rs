//! `quizpilot cycle`: one coordinator pass over a snapshot.

use std::sync::Arc;

use anyhow::Result;
use quizpilot_browser::{Interaction, MemoryDocument};
use quizpilot_config::QuizPilotConfig;
use quizpilot_core::{CycleOutcome, MemoryStorage, QuestionRecord};
use quizpilot_executor::QuestionCoordinator;
use serde::Serialize;

use crate::snapshot::describe;

#[derive(Debug, Serialize)]
pub struct InteractionLine {
    pub target: String,
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub state: Option<QuestionRecord>,
    pub interactions: Vec<InteractionLine>,
}

pub async fn run_once(doc: Arc<MemoryDocument>, config: &QuizPilotConfig) -> Result<CycleReport> {
    let storage = Arc::new(MemoryStorage::new());
    let coordinator = QuestionCoordinator::from_config(doc.clone(), storage, config);
    coordinator.run_flag().set_running(true)?;

    let outcome = coordinator.run_cycle().await?;
    let state = outcome.key().and_then(|key| coordinator.state().get(key));
    let interactions = doc
        .interactions()
        .into_iter()
        .map(|r| InteractionLine {
            target: describe(&*doc, r.node),
            action: match r.interaction {
                Interaction::ScrollIntoView => "scroll_into_view".to_string(),
                Interaction::NativeClick => "click()".to_string(),
                Interaction::Event(event) => event.name().to_string(),
            },
        })
        .collect();

    Ok(CycleReport { outcome, state, interactions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizpilot_browser::load_html;

    #[tokio::test(start_paused = true)]
    async fn reports_outcome_and_clicks() {
        let doc = Arc::new(load_html(
            r#"<body><section>
                <label><input type="radio" name="a"> Four</label>
                <label class="correct"><input type="radio" name="a"> Twenty-two</label>
                <button id="go">Submit</button>
              </section><a class="next" href="/n">Next</a></body>"#,
        ));
        let report = run_once(doc, &QuizPilotConfig::default()).await.unwrap();
        assert!(matches!(report.outcome, CycleOutcome::ConfirmedCorrect { advanced: true, .. }));
        assert_eq!(report.state, Some(QuestionRecord { submitted: true, done: true }));
        assert!(report
            .interactions
            .iter()
            .any(|i| i.target == "button#go" && i.action == "click()"));
    }
}
