//! Twill API - HTML platform layer
//!
//! Provides the compiler wired for browser markup, including:
//! - Document tag tables and namespace rules
//! - `class`/`style` transform modules and the built-in directives
//! - Unified error handling (TwillError)
//!
//! For convenience, this crate provides a global shared compiler.
//! For library use, prefer building an explicit `Compiler` from
//! [`base_options`].

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

pub mod directives;
pub mod error;
pub mod modules;
pub mod options;

pub use error::TwillError;
pub use modules::{ClassModule, StyleModule};
pub use options::{
    base_options, get_tag_namespace, is_pre_tag, is_reserved_tag, is_void_tag, must_use_prop,
};

// Re-export core types
pub use twill_core::{
    BaseOptions, CompiledFunctions, CompiledResult, Compiler, CompilerOptions, Diagnostic,
    RenderFn, Scope, VNode,
};

// Re-export config types from twill-config
pub use twill_config;
pub use twill_config::{Delimiters, Limits, Phase};

/// The shared compiler behind the crate-level functions. Built on first
/// use and reused for the life of the process, so its template cache
/// spans callers.
static DEFAULT_COMPILER: Lazy<Compiler> = Lazy::new(|| Compiler::new(base_options()));

/// Compile a template with the web platform configuration.
pub fn compile(template: &str, user: Option<&CompilerOptions>) -> CompiledResult {
    DEFAULT_COMPILER.compile(template, user)
}

/// Compile a template to callable render functions, memoized.
pub fn compile_to_functions(
    template: &str,
    user: Option<&CompilerOptions>,
) -> Arc<CompiledFunctions> {
    DEFAULT_COMPILER.compile_to_functions(template, user)
}

/// One-shot render: compile (memoized) and evaluate against `scope`.
///
/// This is the recommended API for callers that just want markup out.
/// Templates with compile errors are refused rather than rendered
/// best-effort.
pub fn render(template: &str, scope: &Scope) -> Result<String, TwillError> {
    let functions = compile_to_functions(template, None);
    if !functions.errors.is_empty() {
        return Err(TwillError::from_diagnostics(&functions.errors));
    }
    debug!(target: "twill::compile", "rendering template");
    Ok((functions.render)(scope).to_html())
}
