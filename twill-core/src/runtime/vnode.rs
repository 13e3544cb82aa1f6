//! Virtual nodes produced by render callables.
//!
//! The runtime hands these back to the host; it never mounts or patches
//! anything itself. `to_html` is a convenience serialization used by hosts
//! that want markup and by the test suites.

use serde::Serialize;
use serde_json::Value;

use super::path::display_value;

/// Elements with no content model; serialized without a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VNode {
    Element {
        tag: String,
        ns: Option<String>,
        /// Literal and bound attributes, in render order.
        attrs: Vec<(String, String)>,
        /// Property bindings, in render order. Not part of the attribute
        /// set; `to_html` folds the conventional ones back into markup.
        props: Vec<(String, Value)>,
        children: Vec<VNode>,
    },
    Text(String),
    Comment(String),
    /// Produced when a template has nothing to render.
    Empty,
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            ns: None,
            attrs: Vec::new(),
            props: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        VNode::Text(text.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, VNode::Empty)
    }

    /// Serialize to markup. Text and attribute values are escaped; a
    /// `textContent` or `innerHTML` prop replaces the children the same
    /// way it would on a live node.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            VNode::Element {
                tag,
                attrs,
                props,
                children,
                ..
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                let mut inner_html = None;
                let mut text_content = None;
                for (name, value) in props {
                    match name.as_str() {
                        "innerHTML" => inner_html = Some(value),
                        "textContent" => text_content = Some(value),
                        _ => {
                            out.push(' ');
                            out.push_str(name);
                            out.push_str("=\"");
                            out.push_str(&escape_attr(&display_value(value)));
                            out.push('"');
                        }
                    }
                }
                if VOID_TAGS.contains(&tag.as_str()) {
                    out.push_str(">");
                    return;
                }
                out.push('>');
                if let Some(html) = inner_html {
                    out.push_str(&display_value(html));
                } else if let Some(text) = text_content {
                    out.push_str(&escape_text(&display_value(text)));
                } else {
                    for child in children {
                        child.write_html(out);
                    }
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            VNode::Text(text) => out.push_str(&escape_text(text)),
            VNode::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            VNode::Empty => {}
        }
    }
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
