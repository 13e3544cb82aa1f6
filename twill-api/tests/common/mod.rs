//! Test helpers
//!
//! End-to-end helpers running templates through the web platform
//! compiler.

// Each test binary compiles its own copy and uses a subset.
#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;
use twill_api::{CompiledFunctions, CompiledResult, CompilerOptions, Scope};

/// Route compiler traces to the test writer; filtering follows
/// `RUST_LOG`. Safe to call from every test, only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn compile(template: &str) -> CompiledResult {
    init_tracing();
    twill_api::compile(template, None)
}

pub fn functions(template: &str) -> Arc<CompiledFunctions> {
    init_tracing();
    twill_api::compile_to_functions(template, None)
}

pub fn functions_with(template: &str, user: &CompilerOptions) -> Arc<CompiledFunctions> {
    init_tracing();
    twill_api::compile_to_functions(template, Some(user))
}

pub fn scope(data: Value) -> Scope {
    data.as_object().cloned().unwrap_or_default()
}

/// Compile, assert the template is clean, render against `data`.
pub fn render_html(template: &str, data: Value) -> String {
    let f = functions(template);
    assert!(
        f.errors.is_empty(),
        "unexpected compile errors: {:?}",
        f.errors
    );
    (f.render)(&scope(data)).to_html()
}
