//! HTML snapshot loading.

use std::collections::HashMap;

use scraper::{Html, Node};
use tracing::debug;

use crate::dom::DocumentTree;
use crate::memory::MemoryDocument;

/// Parse an HTML document into a [`MemoryDocument`].
///
/// Comments, doctypes and processing instructions are dropped.
pub fn load_html(source: &str) -> MemoryDocument {
    let html = Html::parse_document(source);
    let doc = MemoryDocument::blank();

    let tree_root = html.tree.root();
    let mut mapping = HashMap::new();
    mapping.insert(tree_root.id(), doc.root());
    let mut textareas = Vec::new();

    for node in tree_root.descendants().skip(1) {
        let Some(parent) = node.parent().and_then(|p| mapping.get(&p.id()).copied()) else {
            continue;
        };
        match node.value() {
            Node::Element(el) => {
                let attrs = el
                    .attrs()
                    .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                    .collect();
                let id = doc.append_element_owned(parent, el.name(), attrs);
                if el.name().eq_ignore_ascii_case("textarea") {
                    textareas.push(id);
                }
                mapping.insert(node.id(), id);
            }
            Node::Text(text) => {
                doc.append_text(parent, text);
            }
            _ => {}
        }
    }

    // A textarea's initial value is its text content.
    for id in textareas {
        let text: String = doc.children(id).into_iter().filter_map(|c| doc.text(c)).collect();
        if !text.is_empty() {
            doc.set_value(id, &text);
        }
    }

    debug!(nodes = mapping.len(), "Loaded HTML snapshot");
    doc
}
