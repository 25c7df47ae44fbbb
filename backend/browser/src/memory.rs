//! In-memory document.
//!
//! An arena DOM implementing [`DocumentTree`], used for HTML snapshots and
//! for driving the coordinator in tests. Every interaction is recorded, and
//! click reactions let a fixture play the part of the quiz platform.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tracing::trace;

use crate::dom::{DocumentTree, DomEvent, NodeId, PageLocation};

/// One recorded interaction with the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    ScrollIntoView,
    NativeClick,
    Event(DomEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedInteraction {
    pub node: NodeId,
    pub interaction: Interaction,
}

/// Callback run after a node is natively clicked.
pub type ClickReaction = Arc<dyn Fn(&MemoryDocument) + Send + Sync>;

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
    value: String,
    checked: bool,
}

impl ElementData {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Default)]
struct Dom {
    nodes: Vec<Node>,
    body: Option<NodeId>,
    location: PageLocation,
    title: Option<String>,
    log: Vec<RecordedInteraction>,
}

impl Dom {
    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn push(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { parent, children: Vec::new(), kind });
        if let Some(p) = parent {
            if let Some(parent_node) = self.nodes.get_mut(p.0) {
                parent_node.children.push(id);
            }
        }
        id
    }

    fn is_radio(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|el| {
            el.tag == "input" && el.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("radio"))
        })
    }

    fn self_hidden(&self, node: NodeId) -> bool {
        let Some(el) = self.element(node) else { return false };
        if matches!(el.tag.as_str(), "head" | "script" | "style" | "template" | "title") {
            return true;
        }
        if el.attr("hidden").is_some() {
            return true;
        }
        if el.tag == "input" && el.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")) {
            return true;
        }
        el.attr("style").is_some_and(|style| {
            let style: String = style
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase();
            style.contains("display:none") || style.contains("visibility:hidden")
        })
    }

    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }
}

/// Arena-backed [`DocumentTree`].
pub struct MemoryDocument {
    dom: RwLock<Dom>,
    reactions: RwLock<HashMap<NodeId, Vec<ClickReaction>>>,
    generation: watch::Sender<u64>,
}

impl MemoryDocument {
    /// A document with only the document node.
    pub fn blank() -> Self {
        let mut dom = Dom::default();
        dom.push(None, NodeKind::Document);
        let (generation, _) = watch::channel(0);
        Self {
            dom: RwLock::new(dom),
            reactions: RwLock::new(HashMap::new()),
            generation,
        }
    }

    /// A document with `<html><body></body></html>`.
    pub fn new() -> Self {
        let doc = Self::blank();
        let html = doc.append_element(doc.root(), "html", &[]);
        doc.append_element(html, "body", &[]);
        doc
    }

    fn read(&self) -> RwLockReadGuard<'_, Dom> {
        self.dom.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Dom> {
        self.dom.write().unwrap_or_else(|e| e.into_inner())
    }

    fn bump(&self) {
        self.generation.send_modify(|g| *g += 1);
    }

    fn record(&self, node: NodeId, interaction: Interaction) {
        trace!(node = node.0, ?interaction, "Recorded interaction");
        self.write().log.push(RecordedInteraction { node, interaction });
    }

    pub fn set_location(&self, path: impl Into<String>, search: impl Into<String>) {
        let mut dom = self.write();
        dom.location = PageLocation { path: path.into(), search: search.into() };
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.write().title = Some(title.into());
    }

    /// Append an element; the first `<body>` appended becomes the body.
    pub fn append_element(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect();
        self.append_element_owned(parent, tag, attrs)
    }

    pub(crate) fn append_element_owned(
        &self,
        parent: NodeId,
        tag: &str,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        let tag = tag.to_ascii_lowercase();
        let id = {
            let mut dom = self.write();
            let data = ElementData {
                value: attrs
                    .iter()
                    .find(|(k, _)| k == "value")
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default(),
                checked: attrs.iter().any(|(k, _)| k == "checked"),
                tag: tag.clone(),
                attrs,
            };
            let id = dom.push(Some(parent), NodeKind::Element(data));
            if tag == "body" && dom.body.is_none() {
                dom.body = Some(id);
            }
            if tag == "title" && dom.title.is_none() {
                dom.title = Some(String::new());
            }
            id
        };
        self.bump();
        id
    }

    pub fn append_text(&self, parent: NodeId, text: &str) -> NodeId {
        let id = {
            let mut dom = self.write();
            let id = dom.push(Some(parent), NodeKind::Text(text.to_string()));
            let in_title = dom.element(parent).is_some_and(|el| el.tag == "title");
            if in_title {
                dom.title.get_or_insert_with(String::new).push_str(text);
            }
            id
        };
        self.bump();
        id
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        {
            let mut dom = self.write();
            let Some(el) = dom.element_mut(node) else { return };
            let name = name.to_ascii_lowercase();
            match el.attrs.iter_mut().find(|(k, _)| *k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => el.attrs.push((name, value.to_string())),
            }
        }
        self.bump();
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        {
            let mut dom = self.write();
            let Some(el) = dom.element_mut(node) else { return };
            el.attrs.retain(|(k, _)| k != name);
        }
        self.bump();
    }

    /// First element whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let dom = self.read();
        (0..dom.nodes.len())
            .map(NodeId)
            .find(|n| dom.element(*n).and_then(|el| el.attr("id")) == Some(id))
    }

    /// Run `reaction` every time `node` is natively clicked.
    pub fn on_click(&self, node: NodeId, reaction: impl Fn(&MemoryDocument) + Send + Sync + 'static) {
        let mut reactions = self.reactions.write().unwrap_or_else(|e| e.into_inner());
        reactions.entry(node).or_default().push(Arc::new(reaction));
    }

    pub fn interactions(&self) -> Vec<RecordedInteraction> {
        self.read().log.clone()
    }

    pub fn interactions_on(&self, node: NodeId) -> Vec<Interaction> {
        self.read()
            .log
            .iter()
            .filter(|r| r.node == node)
            .map(|r| r.interaction)
            .collect()
    }

    /// Native clicks received by `node`.
    pub fn click_count(&self, node: NodeId) -> usize {
        self.interactions_on(node)
            .into_iter()
            .filter(|i| *i == Interaction::NativeClick)
            .count()
    }

    /// Native clicks across the whole document.
    pub fn total_clicks(&self) -> usize {
        self.read()
            .log
            .iter()
            .filter(|r| r.interaction == Interaction::NativeClick)
            .count()
    }

    pub fn clear_interactions(&self) {
        self.write().log.clear();
    }

    pub fn mutation_generation(&self) -> u64 {
        *self.generation.borrow()
    }

    fn activate(&self, node: NodeId, depth: usize) {
        if depth > 4 {
            return;
        }
        enum Activation {
            CheckRadio(Option<String>),
            ToggleCheckbox,
            Forward(NodeId),
            Nothing,
        }
        let activation = {
            let dom = self.read();
            match dom.element(node) {
                Some(el) if dom.is_radio(node) => Activation::CheckRadio(el.attr("name").map(str::to_string)),
                Some(el)
                    if el.tag == "input"
                        && el.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("checkbox")) =>
                {
                    Activation::ToggleCheckbox
                }
                Some(el) if el.tag == "label" => {
                    let target = match el.attr("for") {
                        Some(for_id) => (0..dom.nodes.len())
                            .map(NodeId)
                            .find(|n| dom.element(*n).and_then(|e| e.attr("id")) == Some(for_id)),
                        None => dom.descendants(node).into_iter().find(|n| {
                            dom.element(*n).is_some_and(|e| e.tag == "input")
                        }),
                    };
                    target.map(Activation::Forward).unwrap_or(Activation::Nothing)
                }
                _ => Activation::Nothing,
            }
        };

        match activation {
            Activation::CheckRadio(name) => {
                {
                    let mut dom = self.write();
                    if let Some(name) = name {
                        let group: Vec<NodeId> = (0..dom.nodes.len())
                            .map(NodeId)
                            .filter(|n| {
                                dom.is_radio(*n)
                                    && dom.element(*n).and_then(|e| e.attr("name")) == Some(name.as_str())
                            })
                            .collect();
                        for other in group {
                            if let Some(el) = dom.element_mut(other) {
                                el.checked = false;
                            }
                        }
                    }
                    if let Some(el) = dom.element_mut(node) {
                        el.checked = true;
                    }
                }
                self.bump();
            }
            Activation::ToggleCheckbox => {
                if let Some(el) = self.write().element_mut(node) {
                    el.checked = !el.checked;
                }
                self.bump();
            }
            Activation::Forward(target) => self.activate(target, depth + 1),
            Activation::Nothing => {}
        }
    }

    fn run_reactions(&self, node: NodeId) {
        let reactions: Vec<ClickReaction> = {
            let reactions = self.reactions.read().unwrap_or_else(|e| e.into_inner());
            reactions.get(&node).cloned().unwrap_or_default()
        };
        for reaction in reactions {
            reaction(self);
        }
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dom = self.read();
        f.debug_struct("MemoryDocument")
            .field("nodes", &dom.nodes.len())
            .field("location", &dom.location)
            .finish()
    }
}

impl DocumentTree for MemoryDocument {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn body(&self) -> NodeId {
        self.read().body.unwrap_or(NodeId(0))
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.read().nodes.get(node.0)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.read()
            .nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.read().element(node).map(|el| el.tag.clone())
    }

    fn text(&self, node: NodeId) -> Option<String> {
        match &self.read().nodes.get(node.0)?.kind {
            NodeKind::Text(t) => Some(t.clone()),
            _ => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.read()
            .element(node)?
            .attr(&name.to_ascii_lowercase())
            .map(str::to_string)
    }

    fn is_visible(&self, node: NodeId) -> bool {
        let dom = self.read();
        if matches!(dom.nodes.get(node.0).map(|n| &n.kind), None | Some(NodeKind::Document)) {
            return false;
        }
        let mut current = Some(node);
        while let Some(n) = current {
            if dom.self_hidden(n) {
                return false;
            }
            current = dom.nodes[n.0].parent;
        }
        true
    }

    fn value(&self, node: NodeId) -> Option<String> {
        let dom = self.read();
        let el = dom.element(node)?;
        match el.tag.as_str() {
            "input" | "textarea" | "select" | "button" | "option" => Some(el.value.clone()),
            _ => None,
        }
    }

    fn set_value(&self, node: NodeId, value: &str) {
        if let Some(el) = self.write().element_mut(node) {
            el.value = value.to_string();
        }
        self.bump();
    }

    fn is_checked(&self, node: NodeId) -> bool {
        self.read().element(node).is_some_and(|el| el.checked)
    }

    fn set_checked(&self, node: NodeId, checked: bool) {
        {
            let mut dom = self.write();
            let radio_name = if checked && dom.is_radio(node) {
                dom.element(node).and_then(|el| el.attr("name")).map(str::to_string)
            } else {
                None
            };
            if let Some(name) = radio_name {
                let group: Vec<NodeId> = (0..dom.nodes.len())
                    .map(NodeId)
                    .filter(|n| {
                        *n != node
                            && dom.is_radio(*n)
                            && dom.element(*n).and_then(|e| e.attr("name")) == Some(name.as_str())
                    })
                    .collect();
                for other in group {
                    if let Some(el) = dom.element_mut(other) {
                        el.checked = false;
                    }
                }
            }
            if let Some(el) = dom.element_mut(node) {
                el.checked = checked;
            }
        }
        self.bump();
    }

    fn set_text_content(&self, node: NodeId, text: &str) {
        {
            let mut dom = self.write();
            let old: Vec<NodeId> = match dom.nodes.get_mut(node.0) {
                Some(n) => std::mem::take(&mut n.children),
                None => return,
            };
            for child in old {
                dom.nodes[child.0].parent = None;
            }
            dom.push(Some(node), NodeKind::Text(text.to_string()));
        }
        self.bump();
    }

    fn scroll_into_view(&self, node: NodeId) {
        self.record(node, Interaction::ScrollIntoView);
    }

    fn native_click(&self, node: NodeId) {
        self.record(node, Interaction::NativeClick);
        self.activate(node, 0);
        self.run_reactions(node);
    }

    fn dispatch_event(&self, node: NodeId, event: DomEvent) {
        self.record(node, Interaction::Event(event));
    }

    fn location(&self) -> PageLocation {
        self.read().location.clone()
    }

    fn title(&self) -> String {
        self.read().title.clone().unwrap_or_default()
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }
}
