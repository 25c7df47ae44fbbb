//! Loading page snapshots from disk.

use std::path::Path;

use anyhow::{Context, Result};
use quizpilot_browser::{load_html, DocumentTree, MemoryDocument, NodeId};

/// Parse an HTML file and give it the location the coordinator will hash.
pub async fn load_snapshot(file: &Path, path: Option<&str>, search: Option<&str>) -> Result<MemoryDocument> {
    let html = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read snapshot: {}", file.display()))?;
    let doc = load_html(&html);
    let default_path = format!("/{}", file.file_name().and_then(|n| n.to_str()).unwrap_or_default());
    doc.set_location(path.map(str::to_string).unwrap_or(default_path), search.unwrap_or_default());
    Ok(doc)
}

/// `tag#id.class` label for a node, for human-readable output.
pub fn describe<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> String {
    let mut label = doc.tag_name(node).unwrap_or_else(|| "#text".to_string());
    if let Some(id) = doc.attribute(node, "id").filter(|id| !id.is_empty()) {
        label.push('#');
        label.push_str(&id);
    }
    for class in doc.class_name(node).split_whitespace() {
        label.push('.');
        label.push_str(class);
    }
    label
}
