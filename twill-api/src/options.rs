//! HTML platform configuration.
//!
//! Tag tables and predicates describing the browser document model, plus
//! [`base_options`], the configuration the shared compiler is built from.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use once_cell::sync::Lazy;

use twill_core::{BaseOptions, DirectiveHandler};

use crate::directives;
use crate::modules::{ClassModule, StyleModule};

static HTML_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "html", "body", "base", "head", "link", "meta", "style", "title", "address", "article",
        "aside", "footer", "header", "h1", "h2", "h3", "h4", "h5", "h6", "hgroup", "nav",
        "section", "div", "dd", "dl", "dt", "figcaption", "figure", "picture", "hr", "img", "li",
        "main", "ol", "p", "pre", "ul", "a", "b", "abbr", "bdi", "bdo", "br", "cite", "code",
        "data", "dfn", "em", "i", "kbd", "mark", "q", "rp", "rt", "ruby", "s", "samp", "small",
        "span", "strong", "sub", "sup", "time", "u", "var", "wbr", "area", "audio", "map",
        "track", "video", "embed", "object", "param", "source", "canvas", "script", "noscript",
        "del", "ins", "caption", "col", "colgroup", "table", "thead", "tbody", "tfoot", "td",
        "th", "tr", "button", "datalist", "fieldset", "form", "input", "label", "legend", "meter",
        "optgroup", "option", "output", "progress", "select", "textarea", "details", "dialog",
        "menu", "summary", "blockquote", "iframe", "template",
    ]
    .into_iter()
    .collect()
});

static SVG_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "svg", "animate", "circle", "clippath", "cursor", "defs", "desc", "ellipse", "filter",
        "font-face", "foreignobject", "g", "glyph", "image", "line", "marker", "mask",
        "missing-glyph", "path", "pattern", "polygon", "polyline", "rect", "switch", "symbol",
        "text", "textpath", "tspan", "use", "view",
    ]
    .into_iter()
    .collect()
});

static VOID_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ]
    .into_iter()
    .collect()
});

/// Tags accepting a `value` property.
static VALUE_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["input", "textarea", "option", "select", "progress"]
        .into_iter()
        .collect()
});

pub fn is_reserved_tag(tag: &str) -> bool {
    HTML_TAGS.contains(tag) || SVG_TAGS.contains(tag)
}

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(tag)
}

pub fn is_pre_tag(tag: &str) -> bool {
    tag == "pre"
}

/// Bindings that have to land on the element as properties rather than
/// attributes, because the attribute only sets the initial state.
pub fn must_use_prop(tag: &str, attr: &str) -> bool {
    (attr == "value" && VALUE_TAGS.contains(tag))
        || (attr == "selected" && tag == "option")
        || (attr == "checked" && tag == "input")
        || (attr == "muted" && tag == "video")
}

pub fn get_tag_namespace(tag: &str) -> Option<&'static str> {
    if SVG_TAGS.contains(tag) {
        return Some("svg");
    }
    if tag == "math" {
        return Some("math");
    }
    None
}

/// The web platform configuration: class and style transforms, the
/// built-in directives, and the document tag tables. Source ranges are
/// on in debug builds only.
pub fn base_options() -> BaseOptions {
    let mut directive_table: HashMap<String, DirectiveHandler> = HashMap::new();
    directive_table.insert("text".to_string(), directives::text());
    directive_table.insert("html".to_string(), directives::html());
    directive_table.insert("model".to_string(), directives::model());

    BaseOptions {
        modules: vec![Arc::new(ClassModule), Arc::new(StyleModule)],
        directives: directive_table,
        is_reserved_tag,
        is_void_tag,
        is_pre_tag,
        must_use_prop,
        get_tag_namespace,
        output_source_range: cfg!(debug_assertions),
        ..BaseOptions::default()
    }
}
