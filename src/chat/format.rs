//! Bot reply formatting: `[/path]` tokens become navigation links.
//!
//! A token is `[/` followed by one or more non-`]` characters and a closing
//! `]`. Nothing else is interpreted: unterminated tokens, `[/]`, and any other
//! bracket text stay literal.

use serde::Serialize;

/// Label shown for every navigation link.
pub const LINK_LABEL: &str = "Go to Tool";

/// One rendered piece of a transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Text { text: String },
    Link { path: String, label: String },
}

impl Segment {
    fn text(s: &str) -> Self {
        Self::Text { text: s.to_owned() }
    }

    fn link(path: &str) -> Self {
        Self::Link { path: path.to_owned(), label: LINK_LABEL.to_owned() }
    }
}

/// Split `text` into literal and link segments, preserving order.
///
/// Empty input yields no segments.
#[must_use]
pub fn render(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find("[/") {
        let open = cursor + offset;
        let body = open + 2;
        let Some(close_offset) = text[body..].find(']') else {
            // No closing bracket anywhere after this point.
            break;
        };
        let close = body + close_offset;

        if close == body {
            // `[/]` has an empty path; keep scanning past the `[`.
            cursor = open + 1;
            continue;
        }

        if open > literal_start {
            segments.push(Segment::text(&text[literal_start..open]));
        }
        segments.push(Segment::link(&text[open + 1..close]));
        cursor = close + 1;
        literal_start = cursor;
    }

    if literal_start < text.len() {
        segments.push(Segment::text(&text[literal_start..]));
    }
    segments
}

/// Paths of every link token in `text`, in order.
#[must_use]
pub fn link_paths(text: &str) -> Vec<String> {
    render(text)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Link { path, .. } => Some(path),
            Segment::Text { .. } => None,
        })
        .collect()
}

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;
