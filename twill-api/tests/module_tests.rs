//! Class and style transform tests, end to end.

mod common;
use common::{compile, render_html};

use serde_json::json;

// ===== class =====

#[test]
fn test_literal_class_is_collapsed() {
    let html = render_html("<div class=\"  a   b \">x</div>", json!({}));
    assert_eq!(html, "<div class=\"a b\">x</div>");
}

#[test]
fn test_literal_and_bound_class_merge() {
    let html = render_html(
        "<div class=\"a\" :class=\"extra\">x</div>",
        json!({"extra": "x y"}),
    );
    assert_eq!(html, "<div class=\"a x y\">x</div>");
}

#[test]
fn test_bound_class_alone() {
    let html = render_html("<div :class=\"c\">x</div>", json!({"c": "on"}));
    assert_eq!(html, "<div class=\"on\">x</div>");
}

#[test]
fn test_missing_bound_class_leaves_literal() {
    let html = render_html("<div class=\"a\" :class=\"nope\">x</div>", json!({}));
    assert_eq!(html, "<div class=\"a\">x</div>");
}

#[test]
fn test_class_only_element_still_hoists() {
    let result = compile("<div class=\"a\"><p class=\"b\">t</p></div>");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.render_source, "static 0\n");
    assert!(result.static_render_sources[0].contains("attr class \"a\""));
}

// ===== style =====

#[test]
fn test_literal_style_gains_terminator() {
    let html = render_html("<div style=\"color:red\">x</div>", json!({}));
    assert_eq!(html, "<div style=\"color:red;\">x</div>");
}

#[test]
fn test_literal_and_bound_style_merge() {
    let html = render_html(
        "<div style=\"color:red\" :style=\"s\">x</div>",
        json!({"s": "font-size:2em"}),
    );
    assert_eq!(html, "<div style=\"color:red; font-size:2em\">x</div>");
}

#[test]
fn test_bound_style_keeps_element_dynamic() {
    let result = compile("<div :style=\"s\">x</div>");
    assert!(result.render_source.contains("battr style \"s\""));
    assert!(result.static_render_sources.is_empty());
}
