//! Question panel discovery, prompt extraction, and question keys.

use quizpilot_core::question_key;
use tracing::{debug, trace};

use crate::dom::{DocumentTree, NodeId};
use crate::filters::{is_radio, sanitize_text, truncate_utf16};
use crate::heuristics::Heuristics;
use crate::selector::Selector;

const PANEL_TAGS: &[&str] = &["div", "section", "form"];
const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "legend", "div", "span"];
const PROMPT_HOPS: usize = 4;

/// Every radio input under `scope`, visible or not.
pub fn radios<D: DocumentTree + ?Sized>(doc: &D, scope: NodeId) -> Vec<NodeId> {
    doc.element_descendants(scope)
        .into_iter()
        .filter(|n| is_radio(doc, *n))
        .collect()
}

/// Visible radio inputs under `scope` in document order.
pub fn visible_radios<D: DocumentTree + ?Sized>(doc: &D, scope: NodeId) -> Vec<NodeId> {
    radios(doc, scope)
        .into_iter()
        .filter(|n| doc.is_visible(*n))
        .collect()
}

/// Locate the subtree holding the current question's answer controls.
///
/// Prefers the smallest ancestor of the first visible radio that holds a
/// large enough share of all visible radios; falls back to a container
/// headed "choose any"/"choose one"; finally the body.
pub fn find_question_panel<D: DocumentTree + ?Sized>(doc: &D, heuristics: &Heuristics) -> NodeId {
    let body = doc.body();
    let all = visible_radios(doc, body);

    if let Some(first) = all.first().copied() {
        let candidate = doc
            .closest(first, PANEL_TAGS)
            .or_else(|| doc.parent(first))
            .unwrap_or(body);
        let threshold = (all.len() as f64 / heuristics.panel_ratio).max(1.0);
        let mut current = Some(candidate);
        while let Some(node) = current {
            if node == body {
                break;
            }
            let count = radios(doc, node).len();
            if count as f64 >= threshold {
                debug!(panel = node.0, radios = count, total = all.len(), "Found radio panel");
                return node;
            }
            current = doc.parent(node);
        }
        return candidate;
    }

    for heading in doc.element_descendants(body) {
        let Some(tag) = doc.tag_name(heading) else { continue };
        if !HEADING_TAGS.contains(&tag.as_str()) || !doc.is_visible(heading) {
            continue;
        }
        let text = doc.inner_text(heading).to_lowercase();
        if heuristics.panel_headings.iter().any(|h| text.contains(h.as_str())) {
            if let Some(panel) = doc.closest(heading, PANEL_TAGS).or_else(|| doc.parent(heading)) {
                debug!(panel = panel.0, "Found panel by heading");
                return panel;
            }
        }
    }

    trace!("No panel found; using body");
    body
}

/// Best guess at the question's prompt text.
pub fn extract_prompt<D: DocumentTree + ?Sized>(
    doc: &D,
    panel: NodeId,
    heuristics: &Heuristics,
) -> String {
    let root = doc.root();
    for source in &heuristics.prompt_selectors {
        let Ok(selector) = Selector::parse(source) else { continue };
        if let Some(el) = selector.select_first(doc, root) {
            if doc.is_visible(el) {
                let text = sanitize_text(&doc.inner_text(el));
                if text.encode_utf16().count() > heuristics.min_prompt_chars {
                    return text;
                }
            }
        }
    }

    let mut parent = doc.parent_element(panel);
    let mut hops = 0;
    while let Some(node) = parent {
        if hops >= PROMPT_HOPS {
            break;
        }
        if let Some(sibling) = doc.previous_element_sibling(node) {
            if doc.is_visible(sibling) {
                let text = sanitize_text(&doc.inner_text(sibling));
                for line in split_after_questions(&text) {
                    let line = sanitize_text(line);
                    if line.encode_utf16().count() > heuristics.min_prompt_chars {
                        return line;
                    }
                }
            }
        }
        parent = doc.parent_element(node);
        hops += 1;
    }

    let title = sanitize_text(&doc.title());
    if title.is_empty() {
        "unknown-question".to_string()
    } else {
        title
    }
}

/// Split sanitized text after each `?` that is followed by whitespace.
fn split_after_questions(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    for (i, c) in text.char_indices() {
        if c == '?' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_whitespace()) {
            out.push(&text[start..=i]);
            start = i + 1;
        }
    }
    out.push(&text[start..]);
    out
}

/// Leading panel text folded into the question key.
pub fn panel_snapshot<D: DocumentTree + ?Sized>(
    doc: &D,
    panel: NodeId,
    heuristics: &Heuristics,
) -> String {
    let text = sanitize_text(&doc.inner_text(panel));
    truncate_utf16(&text, heuristics.snapshot_chars).to_string()
}

/// Stable key for the question shown in `panel`.
pub fn question_key_for<D: DocumentTree + ?Sized>(
    doc: &D,
    panel: NodeId,
    heuristics: &Heuristics,
) -> String {
    let location = doc.location();
    let prompt = extract_prompt(doc, panel, heuristics);
    let snapshot = panel_snapshot(doc, panel, heuristics);
    question_key(&location.path, &location.search, &prompt, &snapshot)
}
