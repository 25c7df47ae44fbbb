//! `quizpilot inspect`: what the heuristics see on a snapshot.

use quizpilot_browser::{
    choose_longest, detect_correct_option, extract_prompt, find_next, find_question_panel, find_submit,
    list_options, question_key_for, DocumentTree, Heuristics,
};
use serde::Serialize;

use crate::snapshot::describe;

#[derive(Debug, Serialize)]
pub struct OptionReport {
    pub text: String,
    /// Length in UTF-16 units, the unit the selection policy compares.
    pub length: usize,
    pub checked: bool,
    pub chosen: bool,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub panel: String,
    pub prompt: String,
    pub question_key: String,
    pub options: Vec<OptionReport>,
    pub submit: Option<String>,
    pub next: Option<String>,
    pub revealed: Option<String>,
}

pub fn inspect<D: DocumentTree + ?Sized>(doc: &D, heuristics: &Heuristics) -> InspectReport {
    let panel = find_question_panel(doc, heuristics);
    let chosen = choose_longest(doc, panel, heuristics).map(|c| c.radio);
    let options = list_options(doc, panel, heuristics)
        .into_iter()
        .map(|o| OptionReport {
            length: o.text.encode_utf16().count(),
            checked: doc.is_checked(o.radio),
            chosen: chosen == Some(o.radio),
            text: o.text,
        })
        .collect();

    InspectReport {
        panel: describe(doc, panel),
        prompt: extract_prompt(doc, panel, heuristics),
        question_key: question_key_for(doc, panel, heuristics),
        options,
        submit: find_submit(doc, panel, heuristics).map(|n| describe(doc, n)),
        next: find_next(doc, panel, heuristics).map(|n| describe(doc, n)),
        revealed: detect_correct_option(doc, panel, heuristics).map(|r| r.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizpilot_browser::load_html;

    #[test]
    fn reports_panel_options_and_controls() {
        let doc = load_html(
            r#"<body><form id="quiz">
                <h2 class="question-text">Which is a mammal?</h2>
                <label><input type="radio" name="a"> Shark</label>
                <label class="correct"><input type="radio" name="a"> Dolphin</label>
                <button id="check">Check</button>
              </form><a class="next" href="/n">Next</a></body>"#,
        );
        let report = inspect(&doc, &Heuristics::default());
        assert_eq!(report.panel, "form#quiz");
        assert_eq!(report.prompt, "Which is a mammal?");
        assert_eq!(report.options.len(), 2);
        assert!(report.options[1].chosen);
        assert_eq!(report.options[1].length, 7);
        assert_eq!(report.submit.as_deref(), Some("button#check"));
        assert_eq!(report.next.as_deref(), Some("a.next"));
        assert_eq!(report.revealed.as_deref(), Some("Dolphin"));
    }
}
