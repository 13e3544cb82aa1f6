//! Test helpers
//!
//! End-to-end helpers for the compile-and-render flow.

// Each test binary compiles its own copy and uses a subset.
#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;
use twill_core::{BaseOptions, CompiledFunctions, Compiler, CompilerOptions, Scope};

/// Route compiler traces to the test writer; filtering follows
/// `RUST_LOG`. Safe to call from every test, only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A compiler whose platform treats every tag as reserved, so plain
/// markup is eligible for hoisting.
pub fn compiler() -> Compiler {
    init_tracing();
    fn any_tag(_: &str) -> bool {
        true
    }
    Compiler::new(BaseOptions {
        is_reserved_tag: any_tag,
        ..Default::default()
    })
}

pub fn compile(template: &str) -> Arc<CompiledFunctions> {
    compiler().compile_to_functions(template, None)
}

pub fn compile_with(template: &str, user: &CompilerOptions) -> Arc<CompiledFunctions> {
    compiler().compile_to_functions(template, Some(user))
}

pub fn scope(data: Value) -> Scope {
    data.as_object().cloned().unwrap_or_default()
}

/// Compile, assert the template is clean, render against `data`.
pub fn render_html(template: &str, data: Value) -> String {
    let functions = compile(template);
    assert!(
        functions.errors.is_empty(),
        "unexpected compile errors: {:?}",
        functions.errors
    );
    (functions.render)(&scope(data)).to_html()
}
