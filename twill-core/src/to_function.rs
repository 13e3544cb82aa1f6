//! Turning compile output into callable render functions.
//!
//! [`Compiler::compile`] stops at printed program listings. This layer
//! loads the listings back through the validating loader, wraps them in
//! scope-taking closures and memoizes the result per delimiters and
//! template text. A listing the loader rejects never escapes as a broken
//! callable: the caller gets a render function that produces nothing,
//! plus a fatal diagnostic saying why.

use std::fmt;
use std::sync::{Arc, PoisonError};

use tracing::{debug, error, instrument, warn};

use crate::compile::{CompiledResult, Compiler};
use crate::diag::Diagnostic;
use crate::options::CompilerOptions;
use crate::runtime::{Program, ProgramError, Renderer, Scope, VNode};

/// A compiled template, ready to evaluate against scope data.
pub type RenderFn = Arc<dyn Fn(&Scope) -> VNode + Send + Sync>;

/// The cached product of compiling one template to callables.
pub struct CompiledFunctions {
    pub render: RenderFn,
    /// One callable per hoisted subtree, in reference order.
    pub static_renders: Vec<RenderFn>,
    pub errors: Vec<Diagnostic>,
    pub tips: Vec<Diagnostic>,
}

impl fmt::Debug for CompiledFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFunctions")
            .field("static_renders", &self.static_renders.len())
            .field("errors", &self.errors)
            .field("tips", &self.tips)
            .finish_non_exhaustive()
    }
}

/// The same text compiles differently under different delimiters, so the
/// key carries both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    open: String,
    close: String,
    template: String,
}

impl Compiler {
    /// Compile to callables, memoized per delimiters and template.
    ///
    /// Repeat calls with the same key return the same shared handle, so
    /// callers may compare handles to test whether a recompile happened.
    #[instrument(target = "twill::compile", skip(self, user), fields(len = template.len()))]
    pub fn compile_to_functions(
        &self,
        template: &str,
        user: Option<&CompilerOptions>,
    ) -> Arc<CompiledFunctions> {
        let delimiters = user
            .and_then(|u| u.delimiters.as_ref())
            .unwrap_or(&self.base.delimiters);
        let key = CacheKey {
            open: delimiters.open.clone(),
            close: delimiters.close.clone(),
            template: template.to_string(),
        };
        {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = cache.get(&key) {
                debug!(target: "twill::compile", "serving cached render functions");
                return Arc::clone(hit);
            }
        }

        let result = self.compile(template, user);
        for err in &result.errors {
            error!(target: "twill::compile", message = %err.message, "template error");
        }
        for tip in &result.tips {
            warn!(target: "twill::compile", message = %tip.message, "template tip");
        }

        let functions = match materialize(&result) {
            Ok((render, static_renders)) => CompiledFunctions {
                render,
                static_renders,
                errors: result.errors,
                tips: result.tips,
            },
            Err(e) => {
                error!(target: "twill::compile", error = %e, "render program rejected");
                let mut errors = result.errors;
                errors.push(Diagnostic {
                    message: format!("failed to assemble render program: {e}"),
                    span: None,
                });
                CompiledFunctions {
                    render: noop_render(),
                    static_renders: Vec::new(),
                    errors,
                    tips: result.tips,
                }
            }
        };

        let shared = Arc::new(functions);
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&shared));
        shared
    }
}

/// Load the printed listings and close over them. The main program must
/// not reference hoisted trees beyond the table it ships with.
fn materialize(result: &CompiledResult) -> Result<(RenderFn, Vec<RenderFn>), ProgramError> {
    let program = Program::parse(&result.render_source)?;
    let mut statics = Vec::with_capacity(result.static_render_sources.len());
    for source in &result.static_render_sources {
        statics.push(Program::parse(source)?);
    }
    let count = statics.len();
    if let Some(index) = program.max_static_index() {
        if index >= count {
            return Err(ProgramError::StaticOutOfRange { index, count });
        }
    }

    let program = Arc::new(program);
    let statics = Arc::new(statics);
    let render: RenderFn = {
        let program = Arc::clone(&program);
        let statics = Arc::clone(&statics);
        Arc::new(move |scope: &Scope| Renderer::new(statics.as_slice()).render(&program, scope))
    };
    let static_renders = (0..count)
        .map(|i| {
            let statics = Arc::clone(&statics);
            let f: RenderFn =
                Arc::new(move |scope: &Scope| Renderer::new(&[]).render(&statics[i], scope));
            f
        })
        .collect();
    Ok((render, static_renders))
}

fn noop_render() -> RenderFn {
    Arc::new(|_: &Scope| VNode::Empty)
}
