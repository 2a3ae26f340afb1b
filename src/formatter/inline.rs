// Inline span tokenizer for bold, italic and code runs

use serde::{Deserialize, Serialize};

/// A run of inline text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum Span {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
}

impl Span {
    pub fn text(value: impl Into<String>) -> Self {
        Span::Text(value.into())
    }

    pub fn bold(value: impl Into<String>) -> Self {
        Span::Bold(value.into())
    }

    pub fn italic(value: impl Into<String>) -> Self {
        Span::Italic(value.into())
    }

    pub fn code(value: impl Into<String>) -> Self {
        Span::Code(value.into())
    }

    /// The visible text of this span without markers
    pub fn as_str(&self) -> &str {
        match self {
            Span::Text(s) | Span::Bold(s) | Span::Italic(s) | Span::Code(s) => s,
        }
    }
}

/// Delimited span kinds in the order they are tried at each position
const DELIMITERS: &[(&str, fn(String) -> Span)] = &[
    ("**", Span::Bold),
    ("*", Span::Italic),
    ("`", Span::Code),
];

/// Try to read a delimited span starting exactly at the front of `rest`.
///
/// The enclosed text must be at least one character long and ends at the
/// first closing delimiter after it. Returns the span and the number of
/// bytes consumed.
fn match_delimited(rest: &str) -> Option<(Span, usize)> {
    for &(delim, make) in DELIMITERS {
        let Some(after_open) = rest.strip_prefix(delim) else {
            continue;
        };
        let Some(first) = after_open.chars().next() else {
            continue;
        };
        let search_from = first.len_utf8();
        if let Some(close) = after_open[search_from..].find(delim) {
            let inner_len = search_from + close;
            let inner = &after_open[..inner_len];
            let consumed = delim.len() * 2 + inner_len;
            return Some((make(inner.to_string()), consumed));
        }
    }
    None
}

/// Split a line of text into non-overlapping spans, left to right.
///
/// At each position bold is tried first, then italic, then code. Text that
/// does not open a complete span is kept verbatim, including stray markers.
pub fn tokenize_inline(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        if let Some((span, consumed)) = match_delimited(&text[pos..]) {
            if literal_start < pos {
                spans.push(Span::Text(text[literal_start..pos].to_string()));
            }
            spans.push(span);
            pos += consumed;
            literal_start = pos;
            continue;
        }

        // Advance one character
        pos += text[pos..].chars().next().map_or(1, char::len_utf8);
    }

    if literal_start < text.len() {
        spans.push(Span::Text(text[literal_start..].to_string()));
    }

    spans
}
