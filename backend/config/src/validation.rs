//! Config validation with user-friendly messages.

use quizpilot_browser::Selector;
use thiserror::Error;

use crate::schema::QuizPilotConfig;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// All errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &QuizPilotConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_timing(config, &mut report);
    validate_heuristics(config, &mut report);
    validate_storage(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_timing(config: &QuizPilotConfig, report: &mut ValidationReport) {
    let Some(timing) = &config.timing else { return };
    if timing.poll_interval_ms == Some(0) {
        report.error("timing.pollIntervalMs", "Poll interval must be > 0");
    }
    if timing.reveal_timeout_ms == Some(0) {
        report.error("timing.revealTimeoutMs", "Reveal timeout must be > 0");
    }
    if let Some(ms) = timing.reveal_timeout_ms {
        if ms > 60_000 {
            report.warn(
                "timing.revealTimeoutMs",
                format!("{ms}ms is a long time to wait for a reveal on every wrong answer"),
            );
        }
    }
}

fn validate_heuristics(config: &QuizPilotConfig, report: &mut ValidationReport) {
    let Some(h) = &config.heuristics else { return };
    if !h.panel_ratio.is_finite() || h.panel_ratio < 1.0 {
        report.error("heuristics.panelRatio", "Panel ratio must be a number >= 1");
    }
    if h.snapshot_chars == 0 {
        report.error("heuristics.snapshotChars", "Snapshot length must be > 0");
    }
    if h.ban_text.is_empty() && h.ban_classes.is_empty() && h.ban_attributes.is_empty() {
        report.warn("heuristics", "Ban lists are empty; hint and reveal controls may be clicked");
    }
    if h.submit_keywords.is_empty() && h.page_submit_keywords.is_empty() {
        report.warn("heuristics.submitKeywords", "No submit keywords; answers will never submit");
    }
    for (field, list) in [("nextSelectors", &h.next_selectors), ("promptSelectors", &h.prompt_selectors)] {
        for (i, source) in list.iter().enumerate() {
            if let Err(e) = Selector::parse(source) {
                report.error(format!("heuristics.{field}[{i}]"), e.to_string());
            }
        }
    }
}

fn validate_storage(config: &QuizPilotConfig, report: &mut ValidationReport) {
    let Some(storage) = &config.storage else { return };
    if storage.run_key().trim().is_empty() {
        report.error("storage.runKey", "Run key cannot be empty");
    }
    if storage.state_key().trim().is_empty() {
        report.error("storage.stateKey", "State key cannot be empty");
    }
    if storage.run_key() == storage.state_key() {
        report.error("storage", "Run key and state key must differ");
    }
}

fn validate_logging(config: &QuizPilotConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    let level = logging.level();
    if !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        report.warn("logging.level", format!("Unknown level '{level}'; falling back to info"));
    }
}
