//! Interpolation splitting inside text runs.
//!
//! Text between tags may mix literal runs with delimited expressions. The
//! splitter honors whatever delimiter pair the merged options carry; an
//! opening marker with no closing marker downgrades to literal text.

/// One piece of a mixed text run. Offsets are relative to the start of the
/// run; the tree builder shifts them into template coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TextSegment {
    Literal {
        text: String,
        start: usize,
        len: usize,
    },
    Interp {
        /// Trimmed binding expression.
        expr: String,
        /// The segment as written, delimiters included.
        raw: String,
        start: usize,
        len: usize,
    },
}

/// Split a text run on the configured delimiters. Returns `None` when the
/// run contains no interpolation at all, so plain text stays a single node.
pub(crate) fn split_text(
    text: &str,
    open: &str,
    close: &str,
) -> Option<Vec<TextSegment>> {
    let mut segments = Vec::new();
    let mut cursor = 0usize;
    let mut found = false;

    while let Some(rel_open) = text[cursor..].find(open) {
        let open_at = cursor + rel_open;
        let expr_start = open_at + open.len();
        let rel_close = match text[expr_start..].find(close) {
            Some(rel) => rel,
            // Unterminated marker: the rest of the run is literal.
            None => break,
        };
        let close_at = expr_start + rel_close;
        if open_at > cursor {
            segments.push(TextSegment::Literal {
                text: text[cursor..open_at].to_string(),
                start: cursor,
                len: open_at - cursor,
            });
        }
        let end = close_at + close.len();
        segments.push(TextSegment::Interp {
            expr: text[expr_start..close_at].trim().to_string(),
            raw: text[open_at..end].to_string(),
            start: open_at,
            len: end - open_at,
        });
        found = true;
        cursor = end;
    }

    if !found {
        return None;
    }
    if cursor < text.len() {
        segments.push(TextSegment::Literal {
            text: text[cursor..].to_string(),
            start: cursor,
            len: text.len() - cursor,
        });
    }
    Some(segments)
}
