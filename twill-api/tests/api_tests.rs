//! Crate-level API tests: the shared compiler and one-shot render.

mod common;
use common::{functions, functions_with, render_html, scope};

use std::sync::Arc;

use serde_json::json;
use twill_api::{CompilerOptions, Delimiters};

#[test]
fn test_compile_produces_listing() {
    let result = common::compile("<p>{{m}}</p>");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.render_source, "elem p\n  interp \"m\"\nend\n");
}

#[test]
fn test_compile_to_functions_is_memoized() {
    let a = functions("<section><p>{{m}}</p></section>");
    let b = functions("<section><p>{{m}}</p></section>");
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_render_convenience() {
    common::init_tracing();
    let html = twill_api::render("<p>{{m}}</p>", &scope(json!({"m": "hi"})));
    assert_eq!(html.as_deref(), Ok("<p>hi</p>"));
}

#[test]
fn test_render_refuses_broken_templates() {
    common::init_tracing();
    let err = twill_api::render("<p t-elif=\"x\">a</p>", &scope(json!({"x": true})))
        .expect_err("compile errors should refuse the render");
    let message = err.to_string();
    assert!(message.contains("failed to compile"), "got: {message}");
    assert!(message.contains("t-elif"), "got: {message}");
}

#[test]
fn test_comments_are_opt_in() {
    let html = render_html("<div><!--note--><p>x</p></div>", json!({}));
    assert_eq!(html, "<div><p>x</p></div>");

    let user = CompilerOptions {
        comments: Some(true),
        ..Default::default()
    };
    let f = functions_with("<div><!--note--><p>x</p></div>", &user);
    assert!(f.errors.is_empty(), "{:?}", f.errors);
    let html = (f.render)(&scope(json!({}))).to_html();
    assert_eq!(html, "<div><!--note--><p>x</p></div>");
}

#[test]
fn test_custom_delimiters_end_to_end() {
    let user = CompilerOptions {
        delimiters: Some(Delimiters::new("<%", "%>")),
        ..Default::default()
    };
    let f = functions_with("<p><% m %></p>", &user);
    assert!(f.errors.is_empty(), "{:?}", f.errors);
    let html = (f.render)(&scope(json!({"m": "hi"}))).to_html();
    assert_eq!(html, "<p>hi</p>");

    // The default compiler does not see <% as an interpolation.
    let html = render_html("<p><% m %></p>", json!({"m": "hi"}));
    assert_eq!(html, "<p>&lt;% m %&gt;</p>");
}
