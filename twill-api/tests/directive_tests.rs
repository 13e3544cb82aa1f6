//! Built-in directive tests: t-text, t-html, t-model.

mod common;
use common::{functions, render_html};

use serde_json::json;

#[test]
fn test_text_directive_escapes() {
    let html = render_html(
        "<div t-text=\"msg\">old</div>",
        json!({"msg": "<b>hi</b>"}),
    );
    assert_eq!(html, "<div>&lt;b&gt;hi&lt;/b&gt;</div>");
}

#[test]
fn test_html_directive_is_raw() {
    let html = render_html("<div t-html=\"msg\"></div>", json!({"msg": "<b>hi</b>"}));
    assert_eq!(html, "<div><b>hi</b></div>");
}

#[test]
fn test_model_binds_value() {
    let html = render_html("<input t-model=\"name\">", json!({"name": "Ada"}));
    assert_eq!(html, "<input value=\"Ada\">");
}

#[test]
fn test_model_covers_all_form_controls() {
    let f = functions("<textarea t-model=\"a\"></textarea>");
    assert!(f.errors.is_empty(), "{:?}", f.errors);
    let f = functions("<select t-model=\"b\"></select>");
    assert!(f.errors.is_empty(), "{:?}", f.errors);
}

#[test]
fn test_model_rejected_off_form_controls() {
    let f = functions("<div t-model=\"x\">y</div>");
    assert_eq!(f.errors.len(), 1);
    assert!(
        f.errors[0].message.contains("t-model is not supported on <div>"),
        "got: {}",
        f.errors[0].message
    );
}

#[test]
fn test_text_requires_expression() {
    let f = functions("<div t-text=\"\"></div>");
    assert!(
        f.errors
            .iter()
            .any(|e| e.message.contains("t-text requires an expression")),
        "got: {:?}",
        f.errors
    );
}

#[cfg(debug_assertions)]
#[test]
fn test_unknown_directive_gets_a_tip() {
    let f = functions("<div t-blink=\"x\">y</div>");
    assert!(f.errors.is_empty(), "{:?}", f.errors);
    assert!(
        f.tips
            .iter()
            .any(|t| t.message.contains("unknown directive t-blink")),
        "got: {:?}",
        f.tips
    );
}
