//! Document Tree capability
//!
//! The coordinator never talks to a rendering engine directly. It sees the
//! page through [`DocumentTree`]: opaque node handles, structure, attributes,
//! layout visibility, a handful of mutations, and a mutation feed. A real
//! host (a content script bridge, a CDP session) and the in-memory test
//! document implement the same trait.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Opaque handle to a node inside one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Synthetic events the coordinator dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomEvent {
    PointerDown,
    PointerUp,
    MouseDown,
    MouseUp,
    Click,
    Input,
    Change,
}

impl DomEvent {
    /// The DOM event type string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PointerDown => "pointerdown",
            Self::PointerUp => "pointerup",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::Click => "click",
            Self::Input => "input",
            Self::Change => "change",
        }
    }
}

/// Path and query string of the page hosting the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLocation {
    pub path: String,
    pub search: String,
}

/// Elements that start a new line in rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "legend", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Read/mutate access to a live document.
pub trait DocumentTree: Send + Sync {
    /// The document node.
    fn root(&self) -> NodeId;
    /// The `<body>` element, or the root when the document has none.
    fn body(&self) -> NodeId;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> Vec<NodeId>;
    /// Lower-case tag name; `None` for text and document nodes.
    fn tag_name(&self, node: NodeId) -> Option<String>;
    /// Character data of a text node.
    fn text(&self, node: NodeId) -> Option<String>;
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    /// Whether the node takes part in layout (has an offset parent).
    fn is_visible(&self, node: NodeId) -> bool;
    /// Current form value, `None` for elements without one.
    fn value(&self, node: NodeId) -> Option<String>;
    fn set_value(&self, node: NodeId, value: &str);
    fn is_checked(&self, node: NodeId) -> bool;
    fn set_checked(&self, node: NodeId, checked: bool);
    /// Replace all children with a single text node.
    fn set_text_content(&self, node: NodeId, text: &str);
    fn scroll_into_view(&self, node: NodeId);
    /// Activate the element the way `HTMLElement.click()` does.
    fn native_click(&self, node: NodeId);
    fn dispatch_event(&self, node: NodeId, event: DomEvent);
    fn location(&self) -> PageLocation;
    fn title(&self) -> String;
    /// Mutation feed. The value is a generation counter bumped on every change.
    fn subscribe(&self) -> watch::Receiver<u64>;

    fn is_element(&self, node: NodeId) -> bool {
        self.tag_name(node).is_some()
    }

    fn has_tag(&self, node: NodeId, tag: &str) -> bool {
        self.tag_name(node).is_some_and(|t| t == tag)
    }

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn class_name(&self, node: NodeId) -> String {
        self.attribute(node, "class").unwrap_or_default()
    }

    /// All descendants in document order, excluding `node`.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).into_iter().rev());
        }
        out
    }

    /// Element descendants in document order, excluding `node`.
    fn element_descendants(&self, node: NodeId) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .filter(|n| self.is_element(*n))
            .collect()
    }

    /// `node` itself or its nearest ancestor whose tag is in `tags`.
    fn closest(&self, node: NodeId, tags: &[&str]) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(tag) = self.tag_name(n) {
                if tags.contains(&tag.as_str()) {
                    return Some(n);
                }
            }
            current = self.parent(n);
        }
        None
    }

    /// Nearest ancestor that is an element.
    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|p| self.is_element(*p))
    }

    fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|s| *s == node)?;
        siblings[..index]
            .iter()
            .rev()
            .copied()
            .find(|s| self.is_element(*s))
    }

    /// Whether `ancestor` contains `node` (inclusive).
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Rendered text, approximating `HTMLElement.innerText`.
    fn inner_text(&self, node: NodeId) -> String {
        self.text_excluding(node, &[])
    }

    /// Rendered text with every subtree rooted at one of `skip_tags` removed.
    ///
    /// Hidden descendants are skipped unless `node` itself is hidden, in
    /// which case all text is returned the way a detached element reports it.
    fn text_excluding(&self, node: NodeId, skip_tags: &[&str]) -> String {
        let respect_visibility = self.is_visible(node);
        let mut out = String::new();
        collect_text(self, node, skip_tags, respect_visibility, &mut out);
        out.trim_matches('\n').to_string()
    }
}

fn collect_text<D: DocumentTree + ?Sized>(
    doc: &D,
    node: NodeId,
    skip_tags: &[&str],
    respect_visibility: bool,
    out: &mut String,
) {
    if let Some(text) = doc.text(node) {
        out.push_str(&text);
        return;
    }
    let tag = doc.tag_name(node);
    if let Some(tag) = tag.as_deref() {
        if skip_tags.contains(&tag) {
            return;
        }
        if tag == "br" {
            out.push('\n');
            return;
        }
    }
    let block = tag.as_deref().is_some_and(|t| BLOCK_TAGS.contains(&t));
    if block && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for child in doc.children(node) {
        if respect_visibility && doc.is_element(child) && !doc.is_visible(child) {
            continue;
        }
        collect_text(doc, child, skip_tags, respect_visibility, out);
    }
    if block && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}
