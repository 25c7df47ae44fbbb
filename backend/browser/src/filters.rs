//! Visibility/ban predicates and text sanitation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::{DocumentTree, NodeId};
use crate::heuristics::Heuristics;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static ANSWER_BADGES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)correct answer|your answer").unwrap());

/// Descendants dropped when reading an option's label.
const OPTION_NOISE_TAGS: &[&str] = &["input", "svg", "img", "i", "button"];

/// Collapse whitespace runs to one space and trim.
pub fn sanitize_text(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Sanitized and lower-cased, for comparing two labels.
pub fn normalize_for_compare(text: &str) -> String {
    sanitize_text(text).to_lowercase()
}

/// Whether the element must never be clicked or used as a control.
///
/// Matches the ban lists against rendered text plus form value, the class
/// attribute, and marker attributes.
pub fn is_banned<D: DocumentTree + ?Sized>(doc: &D, node: NodeId, heuristics: &Heuristics) -> bool {
    if !doc.is_element(node) {
        return true;
    }
    let text = format!(
        "{} {}",
        doc.inner_text(node),
        doc.value(node).unwrap_or_default()
    )
    .to_lowercase();
    if heuristics.ban_text.iter().any(|b| text.contains(b.as_str())) {
        return true;
    }
    let class = doc.class_name(node).to_lowercase();
    if heuristics.ban_classes.iter().any(|b| class.contains(b.as_str())) {
        return true;
    }
    heuristics
        .ban_attributes
        .iter()
        .any(|attr| doc.has_attribute(node, attr))
}

/// Visible and not banned.
pub fn is_usable<D: DocumentTree + ?Sized>(doc: &D, node: NodeId, heuristics: &Heuristics) -> bool {
    doc.is_visible(node) && !is_banned(doc, node, heuristics)
}

/// `input[type=radio]`, case-insensitive on the type.
pub fn is_radio<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> bool {
    doc.has_tag(node, "input")
        && doc
            .attribute(node, "type")
            .is_some_and(|t| t.eq_ignore_ascii_case("radio"))
}

/// Label text of an option container, without inputs, icons, buttons, or
/// the platform's "correct answer"/"your answer" badges.
pub fn option_text<D: DocumentTree + ?Sized>(doc: &D, container: NodeId) -> String {
    let raw = doc.text_excluding(container, OPTION_NOISE_TAGS);
    sanitize_text(&ANSWER_BADGES.replace_all(&raw, " "))
}

/// Whether lower-cased text announces "correct", ignoring "incorrect".
///
/// Stricter than a plain substring match on purpose: "incorrect answer" is not a hit.
pub fn mentions_correct(lower: &str, needle: &str) -> bool {
    lower.replace("incorrect", "").contains(needle)
}

/// Truncate to at most `max` UTF-16 code units without splitting a character.
pub fn truncate_utf16(text: &str, max: usize) -> &str {
    let mut units = 0;
    for (i, c) in text.char_indices() {
        units += c.len_utf16();
        if units > max {
            return &text[..i];
        }
    }
    text
}
