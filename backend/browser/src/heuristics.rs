//! Tunable word lists and thresholds used by the page heuristics.

use serde::{Deserialize, Serialize};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Everything the panel/option/control heuristics match against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Heuristics {
    /// Lower-case fragments of text/value that make an element off-limits.
    pub ban_text: Vec<String>,
    /// Lower-case fragments of the class attribute that make an element off-limits.
    pub ban_classes: Vec<String>,
    /// Attributes whose presence makes an element off-limits.
    pub ban_attributes: Vec<String>,
    /// Button text fragments accepted inside the panel.
    pub submit_keywords: Vec<String>,
    /// Button text fragments accepted in the page-wide fallback.
    pub page_submit_keywords: Vec<String>,
    pub next_selectors: Vec<String>,
    /// Exact (trimmed, lower-case) texts of a Next control.
    pub next_texts: Vec<String>,
    pub prompt_selectors: Vec<String>,
    /// Heading fragments that identify a question panel without radios.
    pub panel_headings: Vec<String>,
    /// Text written into empty free-text fields.
    pub placeholder: String,
    /// A container is the panel once it holds `total / ratio` radios.
    pub panel_ratio: f64,
    /// UTF-16 units of panel text folded into the question key.
    pub snapshot_chars: usize,
    /// Prompt candidates must be longer than this.
    pub min_prompt_chars: usize,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            ban_text: strings(&[
                "feedback",
                "report",
                "thanks for your feedback",
                "rate",
                "rating",
                "add some description",
            ]),
            ban_classes: strings(&["feedback", "report", "toast", "popup", "rating"]),
            ban_attributes: strings(&["data-feedback", "data-report"]),
            submit_keywords: strings(&["submit", "check", "finish", "save"]),
            page_submit_keywords: strings(&["submit", "check", "finish"]),
            next_selectors: strings(&[
                r#"a[rel="next"]"#,
                "button.next",
                ".nav-next",
                "a.next",
                r#"button[title="Next"]"#,
                r#"a[title="Next"]"#,
            ]),
            next_texts: strings(&["next", "next ›", "next >", "› next"]),
            prompt_selectors: strings(&[
                ".question-text",
                ".question__text",
                ".question-title",
                ".question__title",
                ".question-heading",
                ".question__heading",
                ".question-view h1",
                ".question-view h2",
                ".question h1",
                ".question h2",
                ".quiz-question",
                ".quiz-question__text",
                "[data-question-text]",
                "[data-question-title]",
                "main h1",
                "main h2",
                "article h1",
                "article h2",
            ]),
            panel_headings: strings(&["choose any", "choose one"]),
            placeholder: "OK".to_string(),
            panel_ratio: 1.5,
            snapshot_chars: 240,
            min_prompt_chars: 6,
        }
    }
}
