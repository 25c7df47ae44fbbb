//! Answer controls: option containers, selection, submit/next lookup,
//! free-text filling, and the redundant synthetic click.

use tracing::{debug, trace};

use crate::dom::{DocumentTree, DomEvent, NodeId};
use crate::filters::{is_banned, is_usable, option_text};
use crate::heuristics::Heuristics;
use crate::panel::visible_radios;
use crate::selector::Selector;

const CONTAINER_HOPS: usize = 6;
const BUTTON_SELECTOR: &str = r#"button, input[type="button"], input[type="submit"]"#;
const TEXT_FIELD_SELECTOR: &str =
    r#"textarea, input[type="text"], input[type="search"], [contenteditable="true"]"#;
const NEXT_TEXT_SELECTOR: &str = "a, button, span";

const CLICK_SEQUENCE: [DomEvent; 5] = [
    DomEvent::PointerDown,
    DomEvent::PointerUp,
    DomEvent::MouseDown,
    DomEvent::MouseUp,
    DomEvent::Click,
];

/// A visible radio paired with its display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionChoice {
    pub radio: NodeId,
    pub text: String,
}

/// Click `node` through every path a page might listen on.
///
/// Returns false without touching the element when it is hidden or banned.
pub fn safe_click<D: DocumentTree + ?Sized>(doc: &D, node: NodeId, heuristics: &Heuristics) -> bool {
    if !is_usable(doc, node, heuristics) {
        trace!(node = node.0, "Click rejected");
        return false;
    }
    doc.scroll_into_view(node);
    doc.native_click(node);
    for event in CLICK_SEQUENCE {
        doc.dispatch_event(node, event);
    }
    true
}

/// The element that displays a radio's label.
pub fn option_container<D: DocumentTree + ?Sized>(
    doc: &D,
    radio: NodeId,
    panel: NodeId,
    heuristics: &Heuristics,
) -> Option<NodeId> {
    if let Some(id) = doc.attribute(radio, "id").filter(|id| !id.is_empty()) {
        let label = doc.element_descendants(panel).into_iter().find(|n| {
            doc.has_tag(*n, "label") && doc.attribute(*n, "for").as_deref() == Some(id.as_str())
        });
        if let Some(label) = label {
            if is_usable(doc, label, heuristics) {
                return Some(label);
            }
        }
    }

    if let Some(wrap) = doc.closest(radio, &["label"]) {
        if is_usable(doc, wrap, heuristics) {
            return Some(wrap);
        }
    }

    let stop = doc.parent(panel);
    let mut current = doc.parent_element(radio);
    for _ in 0..CONTAINER_HOPS {
        let Some(node) = current else { break };
        if Some(node) == stop {
            break;
        }
        if is_usable(doc, node, heuristics) && !doc.inner_text(node).trim().is_empty() {
            return Some(node);
        }
        current = doc.parent_element(node);
    }

    doc.parent_element(radio)
}

/// Label text for `radio`, empty when no container exists.
pub fn radio_text<D: DocumentTree + ?Sized>(
    doc: &D,
    radio: NodeId,
    panel: NodeId,
    heuristics: &Heuristics,
) -> String {
    option_container(doc, radio, panel, heuristics)
        .map(|c| option_text(doc, c))
        .unwrap_or_default()
}

/// All visible options in `panel` with their label text.
pub fn list_options<D: DocumentTree + ?Sized>(
    doc: &D,
    panel: NodeId,
    heuristics: &Heuristics,
) -> Vec<OptionChoice> {
    visible_radios(doc, panel)
        .into_iter()
        .map(|radio| OptionChoice { radio, text: radio_text(doc, radio, panel, heuristics) })
        .collect()
}

/// The option with the longest label; ties keep the earliest.
///
/// Options with empty labels are never chosen.
pub fn choose_longest<D: DocumentTree + ?Sized>(
    doc: &D,
    panel: NodeId,
    heuristics: &Heuristics,
) -> Option<OptionChoice> {
    let mut best: Option<OptionChoice> = None;
    let mut best_len = 0;
    for option in list_options(doc, panel, heuristics) {
        let len = option.text.encode_utf16().count();
        if len > best_len {
            best_len = len;
            best = Some(option);
        }
    }
    best
}

/// The visible radio in `panel` that is currently checked.
pub fn checked_radio<D: DocumentTree + ?Sized>(doc: &D, panel: NodeId) -> Option<NodeId> {
    visible_radios(doc, panel)
        .into_iter()
        .find(|r| doc.is_checked(*r))
}

/// Select `radio`: click it and its container, force it checked, announce the change.
pub fn select_option<D: DocumentTree + ?Sized>(
    doc: &D,
    radio: NodeId,
    panel: NodeId,
    heuristics: &Heuristics,
) {
    safe_click(doc, radio, heuristics);
    if let Some(container) = option_container(doc, radio, panel, heuristics) {
        safe_click(doc, container, heuristics);
    }
    doc.set_checked(radio, true);
    doc.dispatch_event(radio, DomEvent::Change);
}

fn button_text<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> String {
    format!("{} {}", doc.inner_text(node), doc.value(node).unwrap_or_default()).to_lowercase()
}

fn first_button_matching<D: DocumentTree + ?Sized>(
    doc: &D,
    scope: NodeId,
    keywords: &[String],
    heuristics: &Heuristics,
) -> Option<NodeId> {
    let selector = Selector::parse(BUTTON_SELECTOR).ok()?;
    selector.select_all(doc, scope).into_iter().find(|b| {
        if !is_usable(doc, *b, heuristics) {
            return false;
        }
        let text = button_text(doc, *b);
        keywords.iter().any(|k| text.contains(k.as_str()))
    })
}

/// Submit control: panel first, then page-wide with the narrower keyword list.
pub fn find_submit<D: DocumentTree + ?Sized>(
    doc: &D,
    panel: NodeId,
    heuristics: &Heuristics,
) -> Option<NodeId> {
    first_button_matching(doc, panel, &heuristics.submit_keywords, heuristics).or_else(|| {
        debug!("No submit in panel; searching page");
        first_button_matching(doc, doc.root(), &heuristics.page_submit_keywords, heuristics)
    })
}

/// Next control: known selectors panel-first then page-wide, then exact text.
pub fn find_next<D: DocumentTree + ?Sized>(
    doc: &D,
    panel: NodeId,
    heuristics: &Heuristics,
) -> Option<NodeId> {
    let selectors: Vec<Selector> = heuristics
        .next_selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect();

    for scope in [panel, doc.root()] {
        for selector in &selectors {
            if let Some(el) = selector.select_first(doc, scope) {
                if is_usable(doc, el, heuristics) {
                    return Some(el);
                }
            }
        }
    }

    let by_text = Selector::parse(NEXT_TEXT_SELECTOR).ok()?;
    by_text.select_all(doc, doc.root()).into_iter().find(|item| {
        if !doc.is_visible(*item) || is_banned(doc, *item, heuristics) {
            return false;
        }
        let text = doc.inner_text(*item).to_lowercase();
        let text = text.trim();
        heuristics.next_texts.iter().any(|t| t == text)
    })
}

/// Write the placeholder into every empty free-text field of the panel.
///
/// Returns how many fields were filled.
pub fn fill_text_fields<D: DocumentTree + ?Sized>(
    doc: &D,
    panel: NodeId,
    heuristics: &Heuristics,
) -> usize {
    let Ok(selector) = Selector::parse(TEXT_FIELD_SELECTOR) else { return 0 };
    let mut filled = 0;
    for field in selector.select_all(doc, panel) {
        if !is_usable(doc, field, heuristics) {
            continue;
        }
        let editable = doc.attribute(field, "contenteditable").as_deref() == Some("true");
        let current = if editable {
            doc.inner_text(field)
        } else {
            doc.value(field)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| doc.inner_text(field))
        };
        if !current.trim().is_empty() {
            continue;
        }
        if editable {
            doc.set_text_content(field, &heuristics.placeholder);
            doc.dispatch_event(field, DomEvent::Input);
        } else {
            doc.set_value(field, &heuristics.placeholder);
            doc.dispatch_event(field, DomEvent::Input);
            doc.dispatch_event(field, DomEvent::Change);
        }
        filled += 1;
    }
    if filled > 0 {
        debug!(filled, "Filled free-text fields");
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::load_html;
    use crate::memory::{Interaction, MemoryDocument};

    fn h() -> Heuristics {
        Heuristics::default()
    }

    #[test]
    fn container_prefers_label_for() {
        let doc = load_html(
            r#"<body><form id="p">
                <input type="radio" id="r1" name="q"><label for="r1" id="l1">Lyon</label>
              </form></body>"#,
        );
        let panel = doc.element_by_id("p").unwrap();
        let radio = doc.element_by_id("r1").unwrap();
        assert_eq!(option_container(&doc, radio, panel, &h()), doc.element_by_id("l1"));
        assert_eq!(radio_text(&doc, radio, panel, &h()), "Lyon");
    }

    #[test]
    fn container_skips_banned_wrappers() {
        let doc = load_html(
            r#"<body><form id="p">
                <div id="row"><label class="rating-widget"><input type="radio" id="r"> Five stars</label></div>
              </form></body>"#,
        );
        let panel = doc.element_by_id("p").unwrap();
        let radio = doc.element_by_id("r").unwrap();
        // banned label, so the row above it is used instead
        assert_eq!(option_container(&doc, radio, panel, &h()), doc.element_by_id("row"));
    }

    #[test]
    fn longest_wins_and_ties_keep_first() {
        let doc = load_html(
            r#"<body><form id="p">
                <label><input type="radio" id="a"> Rome</label>
                <label><input type="radio" id="b"> Paris</label>
                <label><input type="radio" id="c"> Lyons</label>
                <label hidden><input type="radio" id="d"> Hidden but very long label</label>
              </form></body>"#,
        );
        let panel = doc.element_by_id("p").unwrap();
        let best = choose_longest(&doc, panel, &h()).unwrap();
        assert_eq!(Some(best.radio), doc.element_by_id("b"));
        assert_eq!(best.text, "Paris");
    }

    #[test]
    fn no_options_means_no_choice() {
        let doc = load_html(r#"<body><form id="p"><p>Read the passage.</p></form></body>"#);
        let panel = doc.element_by_id("p").unwrap();
        assert!(choose_longest(&doc, panel, &h()).is_none());
    }

    #[test]
    fn safe_click_sequence_and_rejection() {
        let doc = load_html(
            r#"<body><button id="ok">Submit</button><button id="bad" class="feedback">Submit</button>
               <button id="hid" style="display:none">Submit</button></body>"#,
        );
        let ok = doc.element_by_id("ok").unwrap();
        assert!(safe_click(&doc, ok, &h()));
        assert_eq!(
            doc.interactions_on(ok),
            vec![
                Interaction::ScrollIntoView,
                Interaction::NativeClick,
                Interaction::Event(DomEvent::PointerDown),
                Interaction::Event(DomEvent::PointerUp),
                Interaction::Event(DomEvent::MouseDown),
                Interaction::Event(DomEvent::MouseUp),
                Interaction::Event(DomEvent::Click),
            ]
        );
        for id in ["bad", "hid"] {
            let node = doc.element_by_id(id).unwrap();
            assert!(!safe_click(&doc, node, &h()));
            assert!(doc.interactions_on(node).is_empty());
        }
    }

    #[test]
    fn submit_panel_first_then_page() {
        let doc = load_html(
            r#"<body>
                <form id="p"><input type="radio"><button id="save">Save answer</button></form>
                <form id="q"><input type="radio"></form>
                <button id="fb">Submit feedback</button>
                <input type="submit" id="global" value="Check">
              </body>"#,
        );
        let p = doc.element_by_id("p").unwrap();
        let q = doc.element_by_id("q").unwrap();
        assert_eq!(find_submit(&doc, p, &h()), doc.element_by_id("save"));
        assert_eq!(find_submit(&doc, q, &h()), doc.element_by_id("global"));
    }

    #[test]
    fn page_fallback_does_not_accept_save() {
        let doc = load_html(
            r#"<body><form id="p"><input type="radio"></form><button>Save draft</button></body>"#,
        );
        let p = doc.element_by_id("p").unwrap();
        assert_eq!(find_submit(&doc, p, &h()), None);
    }

    #[test]
    fn next_by_selector_then_text() {
        let doc = load_html(
            r#"<body><form id="p"><input type="radio"></form>
                <span id="n">  Next &gt; </span></body>"#,
        );
        let p = doc.element_by_id("p").unwrap();
        assert_eq!(find_next(&doc, p, &h()), doc.element_by_id("n"));

        let doc = load_html(
            r#"<body><form id="p"><input type="radio"></form>
                <span>Next</span><a id="rel" rel="next" href="/2">Continue</a></body>"#,
        );
        let p = doc.element_by_id("p").unwrap();
        assert_eq!(find_next(&doc, p, &h()), doc.element_by_id("rel"));
    }

    #[test]
    fn next_requires_exact_text() {
        let doc = load_html(
            r#"<body><form id="p"><input type="radio"></form><button>Next lesson</button></body>"#,
        );
        let p = doc.element_by_id("p").unwrap();
        assert_eq!(find_next(&doc, p, &h()), None);
    }

    #[test]
    fn fills_only_empty_unbanned_fields() {
        let doc = load_html(
            r#"<body><form id="p">
                <input type="text" id="empty">
                <input type="text" id="full" value="kept">
                <textarea id="fb" class="feedback-box"></textarea>
                <div contenteditable="true" id="rich"></div>
              </form></body>"#,
        );
        let p = doc.element_by_id("p").unwrap();
        assert_eq!(fill_text_fields(&doc, p, &h()), 2);
        assert_eq!(doc.value(doc.element_by_id("empty").unwrap()).as_deref(), Some("OK"));
        assert_eq!(doc.value(doc.element_by_id("full").unwrap()).as_deref(), Some("kept"));
        assert_eq!(doc.value(doc.element_by_id("fb").unwrap()).as_deref(), Some(""));
        assert_eq!(doc.inner_text(doc.element_by_id("rich").unwrap()), "OK");
    }

    #[test]
    fn prefilled_textarea_is_left_alone() {
        let doc = load_html(r#"<body><form id="p"><textarea id="t">my own notes</textarea></form></body>"#);
        let p = doc.element_by_id("p").unwrap();
        assert_eq!(fill_text_fields(&doc, p, &h()), 0);
        assert_eq!(doc.value(doc.element_by_id("t").unwrap()).as_deref(), Some("my own notes"));
    }

    #[test]
    fn empty_value_falls_back_to_rendered_text() {
        let doc = MemoryDocument::new();
        let form = doc.append_element(doc.body(), "form", &[("id", "p")]);
        let area = doc.append_element(form, "textarea", &[]);
        doc.append_text(area, "typed earlier");
        assert_eq!(doc.value(area).as_deref(), Some(""));
        assert_eq!(fill_text_fields(&doc, form, &h()), 0);
        assert_eq!(doc.value(area).as_deref(), Some(""));
    }

    #[test]
    fn select_option_checks_and_announces() {
        let doc = load_html(
            r#"<body><form id="p">
                <label id="la"><input type="radio" name="q" id="a" checked> Berlin</label>
                <label id="lb"><input type="radio" name="q" id="b"> Paris</label>
              </form></body>"#,
        );
        let p = doc.element_by_id("p").unwrap();
        let b = doc.element_by_id("b").unwrap();
        select_option(&doc, b, p, &h());
        assert!(doc.is_checked(b));
        assert!(!doc.is_checked(doc.element_by_id("a").unwrap()));
        assert_eq!(checked_radio(&doc, p), Some(b));
        assert!(doc.interactions_on(b).contains(&Interaction::Event(DomEvent::Change)));
        assert_eq!(doc.click_count(doc.element_by_id("lb").unwrap()), 1);
    }
}
