// Markdown-to-display formatter for generated content previews
//
// Two passes: each line is classified into a display node, then the text the
// node carries is split into inline spans. Only the small markdown subset the
// generator emits is understood; everything else becomes a paragraph.

pub mod inline;

pub use inline::{tokenize_inline, Span};

use crate::models::Unit;
use serde::{Deserialize, Serialize};

/// Fallback preview title when the content has no heading
pub const DEFAULT_DOCUMENT_TITLE: &str = "Generated Document";

/// One rendered line of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DisplayNode {
    Heading { level: u8, spans: Vec<Span> },
    ListItem { spans: Vec<Span> },
    Paragraph { spans: Vec<Span> },
    Spacer,
}

impl DisplayNode {
    /// Inline spans carried by this node (empty for spacers)
    pub fn spans(&self) -> &[Span] {
        match self {
            DisplayNode::Heading { spans, .. }
            | DisplayNode::ListItem { spans }
            | DisplayNode::Paragraph { spans } => spans,
            DisplayNode::Spacer => &[],
        }
    }

    /// Visible text of the node with markers removed
    pub fn plain_text(&self) -> String {
        self.spans().iter().map(Span::as_str).collect()
    }
}

const LIST_MARKERS: &[char] = &['•', '-'];

/// Text of a list line: everything after the first whitespace that follows
/// the marker. A marker with no whitespace after it yields the rest of the
/// line unchanged.
fn list_item_text(trimmed: &str) -> Option<&str> {
    let marker = trimmed.chars().next().filter(|c| LIST_MARKERS.contains(c))?;
    let rest = &trimmed[marker.len_utf8()..];
    match rest.char_indices().find(|(_, c)| c.is_whitespace()) {
        Some((idx, ws)) => Some(&rest[idx + ws.len_utf8()..]),
        None => Some(rest),
    }
}

/// Classify a single line. Rules are checked in order, first match wins.
pub fn format_line(line: &str) -> DisplayNode {
    if let Some(text) = line.strip_prefix("# ") {
        return DisplayNode::Heading {
            level: 1,
            spans: tokenize_inline(text),
        };
    }
    if let Some(text) = line.strip_prefix("## ") {
        return DisplayNode::Heading {
            level: 2,
            spans: tokenize_inline(text),
        };
    }
    if let Some(text) = line.strip_prefix("### ") {
        return DisplayNode::Heading {
            level: 3,
            spans: tokenize_inline(text),
        };
    }

    let trimmed = line.trim();
    if let Some(text) = list_item_text(trimmed) {
        return DisplayNode::ListItem {
            spans: tokenize_inline(text),
        };
    }

    if trimmed.is_empty() {
        DisplayNode::Spacer
    } else {
        DisplayNode::Paragraph {
            spans: tokenize_inline(line),
        }
    }
}

/// Convert generated content into display nodes, one per line
pub fn format(content: &str) -> Vec<DisplayNode> {
    content.lines().map(format_line).collect()
}

/// Compose an ordered working set into a single markdown document
pub fn compose_markdown(units: &[Unit]) -> String {
    units
        .iter()
        .map(|unit| format!("## {}\n\n{}\n\n", unit.title, unit.content))
        .collect()
}

/// Whitespace separated word count
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Document title taken from the first level 1 or level 2 heading, whichever
/// comes first
pub fn document_title(content: &str) -> String {
    content
        .lines()
        .find_map(|line| {
            line.strip_prefix("# ")
                .or_else(|| line.strip_prefix("## "))
                .map(str::trim)
        })
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_DOCUMENT_TITLE)
        .to_string()
}
