//! Detection of the platform's "correct answer" reveal.

use tracing::debug;

use crate::dom::{DocumentTree, NodeId};
use crate::controls::{option_container, radio_text};
use crate::filters::{is_banned, is_radio, mentions_correct, option_text};
use crate::heuristics::Heuristics;
use crate::panel::visible_radios;

const CHECK_MARKS: &[char] = &['\u{2713}', '\u{2714}'];
const BADGE_TAGS: &[&str] = &["span", "div", "strong", "em"];
const MARKER_SCOPE_TAGS: &[&str] = &["label", "li", "div", "section"];

/// The option the platform flagged as correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedOption {
    pub radio: NodeId,
    pub text: String,
}

fn container_flags_correct<D: DocumentTree + ?Sized>(doc: &D, container: NodeId) -> bool {
    let raw = doc.inner_text(container).to_lowercase();
    if mentions_correct(&raw, "correct answer") || raw.contains(CHECK_MARKS) {
        return true;
    }
    let class = doc.class_name(container).to_lowercase();
    if class.split_whitespace().any(|token| mentions_correct(token, "correct")) {
        return true;
    }
    doc.element_descendants(container).into_iter().any(|n| {
        let Some(tag) = doc.tag_name(n) else { return false };
        if !BADGE_TAGS.contains(&tag.as_str()) {
            return false;
        }
        let text = doc.inner_text(n).to_lowercase();
        mentions_correct(&text, "correct answer")
            || mentions_correct(&text, "correct \u{2713}")
            || text.trim() == "\u{2713}"
    })
}

/// Find the option the page marks as the correct answer, if any.
pub fn detect_correct_option<D: DocumentTree + ?Sized>(
    doc: &D,
    panel: NodeId,
    heuristics: &Heuristics,
) -> Option<RevealedOption> {
    for radio in visible_radios(doc, panel) {
        let Some(container) = option_container(doc, radio, panel, heuristics) else { continue };
        if container_flags_correct(doc, container) {
            let text = option_text(doc, container);
            debug!(radio = radio.0, text = %text, "Reveal found on option container");
            return Some(RevealedOption { radio, text });
        }
    }

    // Loose markers anywhere in the panel, innermost first.
    let markers: Vec<NodeId> = doc
        .element_descendants(panel)
        .into_iter()
        .filter(|n| doc.is_visible(*n) && !is_banned(doc, *n, heuristics))
        .filter(|n| mentions_correct(&doc.inner_text(*n).to_lowercase(), "correct answer"))
        .collect();
    let innermost = markers
        .iter()
        .copied()
        .filter(|m| !markers.iter().any(|other| other != m && doc.contains(*m, *other)));

    for marker in innermost {
        let Some(scope) = doc.closest(marker, MARKER_SCOPE_TAGS) else { continue };
        let radio = doc
            .element_descendants(scope)
            .into_iter()
            .find(|n| is_radio(doc, *n));
        if let Some(radio) = radio.filter(|r| doc.is_visible(*r)) {
            let text = radio_text(doc, radio, panel, heuristics);
            debug!(radio = radio.0, text = %text, "Reveal found via marker");
            return Some(RevealedOption { radio, text });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::load_html;

    fn detect(html: &str) -> Option<(Option<String>, String)> {
        let doc = load_html(html);
        let panel = doc.element_by_id("p").unwrap();
        detect_correct_option(&doc, panel, &Heuristics::default())
            .map(|r| (doc.attribute(r.radio, "id"), r.text))
    }

    #[test]
    fn nothing_before_reveal() {
        assert_eq!(
            detect(r#"<body><form id="p"><label><input type="radio" id="a"> Paris</label></form></body>"#),
            None
        );
    }

    #[test]
    fn badge_text_marks_container() {
        let found = detect(
            r#"<body><form id="p">
                <label><input type="radio" id="a"> Berlin</label>
                <label><input type="radio" id="b"> Paris <span>Correct answer</span></label>
              </form></body>"#,
        );
        assert_eq!(found, Some((Some("b".into()), "Paris".into())));
    }

    #[test]
    fn class_and_check_mark() {
        let by_class = detect(
            r#"<body><form id="p">
                <label class="option"><input type="radio" id="a"> Berlin</label>
                <label class="option is-correct"><input type="radio" id="b"> Paris</label>
              </form></body>"#,
        );
        assert_eq!(by_class.map(|f| f.0), Some(Some("b".into())));

        let by_mark = detect(
            r#"<body><form id="p">
                <label><input type="radio" id="a"> Berlin</label>
                <label><input type="radio" id="b"> Paris &#10004;</label>
              </form></body>"#,
        );
        assert_eq!(by_mark.map(|f| f.0), Some(Some("b".into())));
    }

    #[test]
    fn incorrect_marking_is_ignored() {
        let found = detect(
            r#"<body><form id="p">
                <label class="incorrect"><input type="radio" id="a"> Berlin <em>Incorrect answer</em></label>
                <label><input type="radio" id="b"> Paris</label>
              </form></body>"#,
        );
        assert_eq!(found, None);
    }

    #[test]
    fn loose_marker_maps_to_nearest_radio() {
        // the marker sits beside the label, not inside it
        let found = detect(
            r#"<body><div id="p"><ul>
                <li><label><input type="radio" id="a"> Berlin</label></li>
                <li><label><input type="radio" id="b"> Paris</label><p>Correct answer</p></li>
              </ul></div></body>"#,
        );
        assert_eq!(found, Some((Some("b".into()), "Paris".into())));
    }
}
