//! Document model tests: tag tables, namespaces, property routing.

mod common;
use common::{compile, render_html};

use serde_json::json;

// ===== Tag tables =====

#[test]
fn test_whole_static_template_is_hoisted() {
    let result = compile("<div><p>hi</p><p>there</p></div>");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.render_source, "static 0\n");
    assert_eq!(result.static_render_sources.len(), 1);
    assert!(result.static_render_sources[0].contains("elem p"));
}

#[test]
fn test_unknown_tag_blocks_hoisting() {
    let result = compile("<my-widget><p>hi</p></my-widget>");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(result.render_source.starts_with("elem my-widget"));
    assert!(result.static_render_sources.is_empty());
}

#[test]
fn test_void_tag_needs_no_end_tag() {
    let html = render_html("<div>a<br>b</div>", json!({}));
    assert_eq!(html, "<div>a<br>b</div>");
}

#[test]
fn test_pre_tag_keeps_whitespace() {
    let html = render_html("<div><pre>  </pre><span>  </span></div>", json!({}));
    assert_eq!(html, "<div><pre>  </pre><span></span></div>");

    // Interpolation still applies inside <pre>.
    let html = render_html("<pre>{{x}}</pre>", json!({"x": "a"}));
    assert_eq!(html, "<pre>a</pre>");
}

#[test]
fn test_svg_subtree_inherits_namespace() {
    let result = compile("<svg><circle :r=\"r\"></circle></svg>");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(result.render_source.contains("elem svg svg"));
    assert!(result.render_source.contains("elem circle svg"));

    let html = render_html("<svg><circle :r=\"r\"></circle></svg>", json!({"r": 5}));
    assert_eq!(html, "<svg><circle r=\"5\"></circle></svg>");
}

// ===== Property routing =====

#[test]
fn test_value_binding_becomes_a_property() {
    let result = compile("<input :value=\"v\">");
    assert!(result.render_source.contains("prop value \"v\""));

    // Off a form control the same binding stays an attribute.
    let result = compile("<div :value=\"v\">x</div>");
    assert!(result.render_source.contains("battr value \"v\""));

    let html = render_html("<input :value=\"v\">", json!({"v": "x"}));
    assert_eq!(html, "<input value=\"x\">");
}

#[test]
fn test_state_flags_become_properties() {
    let result = compile("<option :selected=\"s\">a</option>");
    assert!(result.render_source.contains("prop selected \"s\""));

    let result = compile("<input :checked=\"c\">");
    assert!(result.render_source.contains("prop checked \"c\""));

    let result = compile("<video :muted=\"m\"></video>");
    assert!(result.render_source.contains("prop muted \"m\""));
}

#[test]
fn test_reserved_tag_predicate_covers_both_namespaces() {
    assert!(twill_api::is_reserved_tag("div"));
    assert!(twill_api::is_reserved_tag("circle"));
    assert!(!twill_api::is_reserved_tag("my-widget"));
    assert_eq!(twill_api::get_tag_namespace("svg"), Some("svg"));
    assert_eq!(twill_api::get_tag_namespace("math"), Some("math"));
    assert_eq!(twill_api::get_tag_namespace("div"), None);
}
