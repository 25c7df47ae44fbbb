//! Question Coordinator
//!
//! Drives one answering attempt per [`QuestionCoordinator::run_cycle`]:
//! pick the longest option, submit, watch for the page's reveal of the
//! correct option, correct the selection if needed, then advance. Every
//! missing control ends the cycle quietly; the next poll tries again.

use std::sync::Arc;

use quizpilot_browser::{
    checked_radio, choose_longest, detect_correct_option, fill_text_fields, find_next, find_question_panel,
    find_submit, normalize_for_compare, question_key_for, radio_text, safe_click, select_option, wait_for,
    DocumentTree, NodeId,
};
use quizpilot_config::QuizPilotConfig;
use quizpilot_core::{CycleOutcome, QuestionStateStore, Result, RunFlag, TabStorage};
use quizpilot_logging::EventLogger;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::settings::CoordinatorSettings;

pub struct QuestionCoordinator<D: DocumentTree + ?Sized> {
    doc: Arc<D>,
    run_flag: RunFlag,
    state: QuestionStateStore,
    settings: CoordinatorSettings,
}

impl<D: DocumentTree + ?Sized> QuestionCoordinator<D> {
    pub fn new(doc: Arc<D>, run_flag: RunFlag, state: QuestionStateStore, settings: CoordinatorSettings) -> Self {
        Self { doc, run_flag, state, settings }
    }

    /// Coordinator over `doc` using the storage keys, timings and heuristics in `config`.
    pub fn from_config(doc: Arc<D>, storage: Arc<dyn TabStorage>, config: &QuizPilotConfig) -> Self {
        let keys = config.storage();
        Self::new(
            doc,
            RunFlag::with_key(storage.clone(), keys.run_key()),
            QuestionStateStore::with_key(storage, keys.state_key()),
            CoordinatorSettings::from_config(config),
        )
    }

    pub fn document(&self) -> &Arc<D> {
        &self.doc
    }

    pub fn run_flag(&self) -> &RunFlag {
        &self.run_flag
    }

    pub fn state(&self) -> &QuestionStateStore {
        &self.state
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Run one attempt and log its outcome as a cycle event.
    ///
    /// Errors only come from persisting question state.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let outcome = self.attempt().await?;
        EventLogger::log_outcome(&outcome);
        Ok(outcome)
    }

    async fn attempt(&self) -> Result<CycleOutcome> {
        if !self.run_flag.is_running() {
            debug!("Run flag not set; skipping cycle");
            return Ok(CycleOutcome::NotRunning);
        }

        let doc = &*self.doc;
        let heuristics = &self.settings.heuristics;

        let panel = find_question_panel(doc, heuristics);
        let key = question_key_for(doc, panel, heuristics);
        if self.state.is_done(&key) {
            debug!(key = %key, "Question already finished");
            return Ok(CycleOutcome::AlreadyDone { key });
        }

        let Some(choice) = choose_longest(doc, panel, heuristics) else {
            info!(key = %key, "No options in panel");
            return Ok(CycleOutcome::NoOptions { key });
        };
        info!(key = %key, text = %choice.text, "Choosing longest option");
        if !doc.is_checked(choice.radio) {
            select_option(doc, choice.radio, panel, heuristics);
            sleep(self.settings.settle).await;
        }

        fill_text_fields(doc, panel, heuristics);

        let Some(submit) = find_submit(doc, panel, heuristics) else {
            info!(key = %key, "Submit not found");
            return Ok(CycleOutcome::NoSubmit { key });
        };
        debug!("Clicking submit");
        safe_click(doc, submit, heuristics);
        self.state.mark_submitted(&key)?;

        let revealed = wait_for(
            doc,
            self.settings.reveal_timeout,
            self.settings.reveal_grace,
            || detect_correct_option(doc, panel, heuristics),
        )
        .await;

        let Some(revealed) = revealed else {
            info!(key = %key, "Correct option not revealed; trying Next");
            if self.click_next(panel) {
                self.state.mark_done(&key)?;
                return Ok(CycleOutcome::AdvancedWithoutReveal { key });
            }
            return Ok(CycleOutcome::StalledWithoutNext { key });
        };
        info!(key = %key, text = %revealed.text, "Page revealed the correct option");

        let current = checked_radio(doc, panel);
        let current_text = current
            .map(|radio| normalize_for_compare(&radio_text(doc, radio, panel, heuristics)))
            .unwrap_or_default();
        let correct_text = if revealed.text.trim().is_empty() {
            normalize_for_compare(&radio_text(doc, revealed.radio, panel, heuristics))
        } else {
            normalize_for_compare(&revealed.text)
        };

        if current.is_some() && current_text == correct_text {
            info!(key = %key, "Selection already correct");
            let advanced = self.click_next(panel);
            if advanced {
                self.state.mark_done(&key)?;
            }
            return Ok(CycleOutcome::ConfirmedCorrect { key, advanced });
        }

        info!(key = %key, from = %current_text, to = %correct_text, "Switching to the revealed option");
        select_option(doc, revealed.radio, panel, heuristics);
        sleep(self.settings.settle).await;

        let resubmitted = match find_submit(doc, panel, heuristics) {
            Some(submit) => {
                safe_click(doc, submit, heuristics);
                sleep(self.settings.resubmit_settle).await;
                true
            }
            None => false,
        };

        let advanced = self.click_next(panel);
        self.state.mark_done(&key)?;
        Ok(CycleOutcome::Corrected { key, resubmitted, advanced })
    }

    /// Click Next if one exists. True when a Next control was found.
    fn click_next(&self, panel: NodeId) -> bool {
        let doc = &*self.doc;
        let heuristics = &self.settings.heuristics;
        match find_next(doc, panel, heuristics) {
            Some(next) => {
                debug!("Clicking next");
                safe_click(doc, next, heuristics);
                true
            }
            None => false,
        }
    }
}
