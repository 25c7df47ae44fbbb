//! Minimal CSS selector engine.
//!
//! Supports selector lists (`,`), descendant combinators (whitespace), and
//! compound selectors made of a tag or `*`, `.class`, `#id`, `[attr]` and
//! `[attr="value"]`. That covers every selector the answer heuristics use.

use quizpilot_core::{QuizError, Result};

use crate::dom::{DocumentTree, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatch {
    Exists(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn matches<D: DocumentTree + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        let Some(tag) = doc.tag_name(node) else { return false };
        if let Some(want) = &self.tag {
            if *want != tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if doc.attribute(node, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = doc.class_name(node);
            let tokens: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| tokens.contains(&c.as_str())) {
                return false;
            }
        }
        self.attrs.iter().all(|attr| match attr {
            AttrMatch::Exists(name) => doc.has_attribute(node, name),
            AttrMatch::Equals(name, value) => {
                doc.attribute(node, name).as_deref() == Some(value.as_str())
            }
        })
    }
}

/// One complex selector: compounds joined by descendant combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<Compound>,
}

impl Complex {
    fn matches<D: DocumentTree + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        let Some((last, rest)) = self.parts.split_last() else { return false };
        last.matches(doc, node) && match_ancestors(doc, node, rest)
    }
}

fn match_ancestors<D: DocumentTree + ?Sized>(doc: &D, node: NodeId, parts: &[Compound]) -> bool {
    let Some((last, rest)) = parts.split_last() else { return true };
    let mut current = doc.parent(node);
    while let Some(ancestor) = current {
        if last.matches(doc, ancestor) && match_ancestors(doc, ancestor, rest) {
            return true;
        }
        current = doc.parent(ancestor);
    }
    false
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        let mut alternatives = Vec::new();
        for group in split_top_level(source, ',')? {
            let group = group.trim();
            if group.is_empty() {
                return Err(QuizError::Selector(format!("empty selector in '{source}'")));
            }
            let mut parts = Vec::new();
            for piece in split_top_level(group, ' ')? {
                let piece = piece.trim();
                if piece.is_empty() {
                    continue;
                }
                parts.push(parse_compound(piece, source)?);
            }
            alternatives.push(Complex { parts });
        }
        Ok(Self { source: source.to_string(), alternatives })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches<D: DocumentTree + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(doc, node))
    }

    /// Matching descendants of `scope` in document order (`scope` excluded).
    pub fn select_all<D: DocumentTree + ?Sized>(&self, doc: &D, scope: NodeId) -> Vec<NodeId> {
        doc.element_descendants(scope)
            .into_iter()
            .filter(|n| self.matches(doc, *n))
            .collect()
    }

    pub fn select_first<D: DocumentTree + ?Sized>(&self, doc: &D, scope: NodeId) -> Option<NodeId> {
        doc.element_descendants(scope)
            .into_iter()
            .find(|n| self.matches(doc, *n))
    }
}

/// Parse and run `selector` against the descendants of `scope`.
pub fn query_selector_all<D: DocumentTree + ?Sized>(
    doc: &D,
    scope: NodeId,
    selector: &str,
) -> Result<Vec<NodeId>> {
    Ok(Selector::parse(selector)?.select_all(doc, scope))
}

pub fn query_selector<D: DocumentTree + ?Sized>(
    doc: &D,
    scope: NodeId,
    selector: &str,
) -> Result<Option<NodeId>> {
    Ok(Selector::parse(selector)?.select_first(doc, scope))
}

/// Split on `sep` outside of `[...]` and quotes.
fn split_top_level(input: &str, sep: char) -> Result<Vec<&str>> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| QuizError::Selector(format!("unbalanced ']' in '{input}'")))?;
            }
            (None, c) if c == sep && depth == 0 => {
                out.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 || quote.is_some() {
        return Err(QuizError::Selector(format!("unterminated attribute in '{input}'")));
    }
    out.push(&input[start..]);
    Ok(out)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(piece: &str, source: &str) -> Result<Compound> {
    let unsupported = || QuizError::Selector(format!("'{piece}' in '{source}'"));
    let mut compound = Compound::default();
    let chars: Vec<char> = piece.chars().collect();
    let mut i = 0;

    let read_ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_ident_char(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    if i < chars.len() && chars[i] == '*' {
        i += 1;
    } else if i < chars.len() && is_ident_char(chars[i]) {
        compound.tag = Some(read_ident(&mut i).to_ascii_lowercase());
    }

    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                let class = read_ident(&mut i);
                if class.is_empty() {
                    return Err(unsupported());
                }
                compound.classes.push(class);
            }
            '#' => {
                i += 1;
                let id = read_ident(&mut i);
                if id.is_empty() {
                    return Err(unsupported());
                }
                compound.id = Some(id);
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|p| p + i)
                    .ok_or_else(unsupported)?;
                let inner: String = chars[i + 1..close].iter().collect();
                compound.attrs.push(parse_attr(&inner).ok_or_else(unsupported)?);
                i = close + 1;
            }
            _ => return Err(unsupported()),
        }
    }
    Ok(compound)
}

fn parse_attr(inner: &str) -> Option<AttrMatch> {
    match inner.split_once('=') {
        None => {
            let name = inner.trim();
            (!name.is_empty() && name.chars().all(is_ident_char))
                .then(|| AttrMatch::Exists(name.to_ascii_lowercase()))
        }
        Some((name, value)) => {
            let name = name.trim();
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Some(AttrMatch::Equals(name.to_ascii_lowercase(), value.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::load_html;

    const PAGE: &str = r#"<html><body>
        <main><h1 class="title big">Quiz</h1></main>
        <article><section><h2 id="sub">Part 2</h2></section></article>
        <nav><a rel="next" href="/2">Next</a><button class="next" title="Next">›</button></nav>
        <input type="radio" name="q"><input type="text">
    </body></html>"#;

    #[test]
    fn compound_and_descendant() {
        let doc = load_html(PAGE);
        let body = doc.body();
        assert_eq!(query_selector_all(&doc, body, "main h1").unwrap().len(), 1);
        assert_eq!(query_selector_all(&doc, body, "article h2").unwrap().len(), 1);
        assert_eq!(query_selector_all(&doc, body, "main h2").unwrap().len(), 0);
        assert_eq!(query_selector_all(&doc, body, "h1.title.big").unwrap().len(), 1);
        assert_eq!(query_selector_all(&doc, body, "#sub").unwrap().len(), 1);
    }

    #[test]
    fn attribute_selectors() {
        let doc = load_html(PAGE);
        let body = doc.body();
        assert!(query_selector(&doc, body, r#"a[rel="next"]"#).unwrap().is_some());
        assert!(query_selector(&doc, body, "button[title='Next']").unwrap().is_some());
        assert!(query_selector(&doc, body, r#"input[type="radio"]"#).unwrap().is_some());
        assert_eq!(query_selector_all(&doc, body, "[rel]").unwrap().len(), 1);
        assert!(query_selector(&doc, body, r#"a[rel="prev"]"#).unwrap().is_none());
    }

    #[test]
    fn selector_list_keeps_document_order() {
        let doc = load_html(PAGE);
        let found = query_selector_all(&doc, doc.body(), r#"input[type="text"], a, button"#).unwrap();
        let tags: Vec<String> = found.iter().filter_map(|n| doc.tag_name(*n)).collect();
        assert_eq!(tags, vec!["a", "button", "input"]);
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(Selector::parse("div > p").is_err());
        assert!(Selector::parse("a:hover").is_err());
        assert!(Selector::parse("a[rel").is_err());
        assert!(Selector::parse("a,").is_err());
    }
}
