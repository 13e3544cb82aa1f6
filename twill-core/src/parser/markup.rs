//! Low-level markup scanning.
//!
//! The scanner turns template text into a flat stream of tag, text and
//! comment events with byte spans. It knows nothing about directives,
//! nesting or interpolation; the tree builder owns all of that. A `<` that
//! does not begin a recognizable construct is ordinary text.

use thiserror::Error;

use crate::diag::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawAttr {
    pub name: String,
    /// Empty for bare boolean attributes.
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StartTag {
    pub tag: String,
    pub attrs: Vec<RawAttr>,
    pub self_closing: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MarkupEvent {
    Start(StartTag),
    End { tag: String, span: Span },
    Text { text: String, span: Span },
    Comment { text: String, span: Span },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum MarkupErrorKind {
    #[error("comment is never terminated")]
    UnterminatedComment,
    #[error("start tag is never terminated")]
    UnterminatedStartTag,
    #[error("end tag is never terminated")]
    UnterminatedEndTag,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub(crate) struct MarkupError {
    pub kind: MarkupErrorKind,
    pub span: Span,
}

enum AttrScan {
    Found(RawAttr, usize),
    /// Stray character where an attribute name should start.
    Skip,
    Unterminated,
}

/// Cursor over the trimmed template. Scanning is byte-driven but only ever
/// splits at ASCII markup characters, so slices stay on char boundaries.
pub(crate) struct MarkupScanner<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> MarkupScanner<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn next_event(&mut self) -> Option<Result<MarkupEvent, MarkupError>> {
        loop {
            if self.pos >= self.src.len() {
                return None;
            }
            let rest = &self.src[self.pos..];
            if rest.starts_with("<!--") {
                return Some(self.scan_comment());
            }
            if rest.starts_with("<!") {
                // Doctype or other declaration: no node for it.
                self.skip_declaration();
                continue;
            }
            if rest.starts_with("</") && self.is_name_start(self.pos + 2) {
                return Some(self.scan_end_tag());
            }
            if rest.starts_with('<') && self.is_name_start(self.pos + 1) {
                return Some(self.scan_start_tag());
            }
            return Some(Ok(self.scan_text()));
        }
    }

    fn is_name_start(&self, at: usize) -> bool {
        matches!(self.src.as_bytes().get(at), Some(c) if c.is_ascii_alphabetic())
    }

    /// End index of a tag name starting at `from`.
    fn scan_name_end(&self, from: usize) -> usize {
        let bytes = self.src.as_bytes();
        let mut i = from;
        while i < bytes.len() {
            let c = bytes[i];
            if c.is_ascii_alphanumeric() || matches!(c, b'-' | b'_' | b'.' | b':') {
                i += 1;
            } else {
                break;
            }
        }
        i
    }

    fn skip_ws(&self, from: usize) -> usize {
        let bytes = self.src.as_bytes();
        let mut i = from;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    }

    fn fail(&mut self, kind: MarkupErrorKind, start: usize) -> Result<MarkupEvent, MarkupError> {
        // Nothing after an unterminated construct can be trusted; abandon
        // the rest of the input.
        self.pos = self.src.len();
        Err(MarkupError {
            kind,
            span: Span::new(start, self.src.len()),
        })
    }

    fn scan_comment(&mut self) -> Result<MarkupEvent, MarkupError> {
        let start = self.pos;
        let text_start = start + 4;
        match self.src[text_start..].find("-->") {
            Some(rel) => {
                let text_end = text_start + rel;
                self.pos = text_end + 3;
                Ok(MarkupEvent::Comment {
                    text: self.src[text_start..text_end].to_string(),
                    span: Span::new(start, self.pos),
                })
            }
            None => self.fail(MarkupErrorKind::UnterminatedComment, start),
        }
    }

    fn skip_declaration(&mut self) {
        match self.src[self.pos..].find('>') {
            Some(rel) => self.pos += rel + 1,
            None => self.pos = self.src.len(),
        }
    }

    fn scan_end_tag(&mut self) -> Result<MarkupEvent, MarkupError> {
        let start = self.pos;
        let name_start = start + 2;
        let name_end = self.scan_name_end(name_start);
        let tag = self.src[name_start..name_end].to_string();
        match self.src[name_end..].find('>') {
            Some(rel) => {
                self.pos = name_end + rel + 1;
                Ok(MarkupEvent::End {
                    tag,
                    span: Span::new(start, self.pos),
                })
            }
            None => self.fail(MarkupErrorKind::UnterminatedEndTag, start),
        }
    }

    fn scan_start_tag(&mut self) -> Result<MarkupEvent, MarkupError> {
        let start = self.pos;
        let name_start = start + 1;
        let name_end = self.scan_name_end(name_start);
        let tag = self.src[name_start..name_end].to_string();

        let mut attrs = Vec::new();
        let mut i = name_end;
        loop {
            i = self.skip_ws(i);
            if i >= self.src.len() {
                return self.fail(MarkupErrorKind::UnterminatedStartTag, start);
            }
            let c = self.src.as_bytes()[i];
            if c == b'>' {
                self.pos = i + 1;
                return Ok(MarkupEvent::Start(StartTag {
                    tag,
                    attrs,
                    self_closing: false,
                    span: Span::new(start, self.pos),
                }));
            }
            if c == b'/' && self.src.as_bytes().get(i + 1) == Some(&b'>') {
                self.pos = i + 2;
                return Ok(MarkupEvent::Start(StartTag {
                    tag,
                    attrs,
                    self_closing: true,
                    span: Span::new(start, self.pos),
                }));
            }
            match self.scan_attr(i) {
                AttrScan::Found(attr, next) => {
                    attrs.push(attr);
                    i = next;
                }
                AttrScan::Skip => i += 1,
                AttrScan::Unterminated => {
                    return self.fail(MarkupErrorKind::UnterminatedStartTag, start)
                }
            }
        }
    }

    /// Scan one attribute starting at `i`.
    fn scan_attr(&self, i: usize) -> AttrScan {
        let bytes = self.src.as_bytes();
        let name_start = i;
        let mut j = i;
        while j < bytes.len() && !is_attr_name_terminator(bytes[j]) {
            j += 1;
        }
        if j == name_start {
            return AttrScan::Skip;
        }
        let name = self.src[name_start..j].to_string();

        let after_name = self.skip_ws(j);
        if bytes.get(after_name) != Some(&b'=') {
            // Bare boolean attribute.
            return AttrScan::Found(
                RawAttr {
                    name,
                    value: String::new(),
                    span: Span::new(name_start, j),
                },
                j,
            );
        }

        let value_start = self.skip_ws(after_name + 1);
        if value_start >= bytes.len() {
            return AttrScan::Unterminated;
        }
        let (value, end) = match bytes[value_start] {
            quote @ (b'"' | b'\'') => {
                let content_start = value_start + 1;
                let mut k = content_start;
                while k < bytes.len() && bytes[k] != quote {
                    k += 1;
                }
                if k >= bytes.len() {
                    return AttrScan::Unterminated;
                }
                (self.src[content_start..k].to_string(), k + 1)
            }
            _ => {
                let mut k = value_start;
                while k < bytes.len() && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    k += 1;
                }
                (self.src[value_start..k].to_string(), k)
            }
        };
        AttrScan::Found(
            RawAttr {
                name,
                value,
                span: Span::new(name_start, end),
            },
            end,
        )
    }

    fn scan_text(&mut self) -> MarkupEvent {
        let start = self.pos;
        let bytes = self.src.as_bytes();
        let mut j = self.pos + 1;
        while j < bytes.len() {
            if bytes[j] == b'<' && self.is_construct_start(j) {
                break;
            }
            j += 1;
        }
        self.pos = j;
        MarkupEvent::Text {
            text: self.src[start..j].to_string(),
            span: Span::new(start, j),
        }
    }

    /// Whether the `<` at `at` begins a construct the scanner recognizes.
    fn is_construct_start(&self, at: usize) -> bool {
        match self.src.as_bytes().get(at + 1) {
            Some(b'!') => true,
            Some(b'/') => self.is_name_start(at + 2),
            Some(c) => c.is_ascii_alphabetic(),
            None => false,
        }
    }
}

fn is_attr_name_terminator(c: u8) -> bool {
    c.is_ascii_whitespace() || matches!(c, b'"' | b'\'' | b'<' | b'>' | b'/' | b'=')
}
