//! The compiler instance and its compile entry point.
//!
//! A [`Compiler`] pairs shared platform [`BaseOptions`] with a
//! [`Pipeline`], the strategy that actually turns text into render
//! programs. Every call merges per-call overrides, validates the merged
//! options, runs the pipeline on the trimmed template and carries all
//! diagnostics out in the result. Compilation never fails: the worst
//! input still yields a result whose errors say what went wrong.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, instrument};

use crate::ast::Ast;
use crate::codegen::generate;
use crate::detector::detect;
use crate::diag::{Diagnostic, DiagnosticSink};
use crate::optimizer::optimize;
use crate::options::{BaseOptions, CompilerOptions, FinalOptions};
use crate::parser::parse;
use crate::to_function::{CacheKey, CompiledFunctions};

/// Everything one compile call produces. `render_source` is the printed
/// listing of the main program; the loader in
/// [`crate::runtime::Program::parse`] turns it back into ops.
#[derive(Debug, Clone, Default)]
pub struct CompiledResult {
    /// The annotated tree, absent when compilation was abandoned before
    /// parsing.
    pub ast: Option<Ast>,
    pub render_source: String,
    pub static_render_sources: Vec<String>,
    pub errors: Vec<Diagnostic>,
    pub tips: Vec<Diagnostic>,
}

/// What a pipeline hands back to the compiler.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub ast: Option<Ast>,
    pub render_source: String,
    pub static_render_sources: Vec<String>,
}

/// The compile strategy a [`Compiler`] runs. Swappable so embedders can
/// layer passes of their own or stub phases out under test.
pub trait Pipeline: Send + Sync {
    fn run(&self, template: &str, opts: &FinalOptions, sink: &mut DiagnosticSink)
        -> PipelineOutput;
}

/// Parse, optionally optimize, generate.
pub struct DefaultPipeline;

impl Pipeline for DefaultPipeline {
    fn run(
        &self,
        template: &str,
        opts: &FinalOptions,
        sink: &mut DiagnosticSink,
    ) -> PipelineOutput {
        let mut ast = parse(template, opts, sink);
        if opts.optimize {
            optimize(&mut ast, opts);
        }
        let code = generate(&ast, opts, sink);
        PipelineOutput {
            render_source: code.program.to_string(),
            static_render_sources: code.static_programs.iter().map(|p| p.to_string()).collect(),
            ast: Some(ast),
        }
    }
}

/// A compiler bound to one platform configuration.
pub struct Compiler {
    pub(crate) base: Arc<BaseOptions>,
    pub(crate) pipeline: Arc<dyn Pipeline>,
    pub(crate) cache: Mutex<HashMap<CacheKey, Arc<CompiledFunctions>>>,
}

impl Compiler {
    pub fn new(base: BaseOptions) -> Self {
        Self::with_pipeline(base, Arc::new(DefaultPipeline))
    }

    pub fn with_pipeline(base: BaseOptions, pipeline: Arc<dyn Pipeline>) -> Self {
        Self {
            base: Arc::new(base),
            pipeline,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn base_options(&self) -> &BaseOptions {
        &self.base
    }

    /// Compile a template with optional per-call overrides.
    ///
    /// Surrounding whitespace is trimmed before parsing; when source
    /// ranges are requested, reported spans are shifted back so they
    /// index into the caller's untrimmed string. Invalid merged options
    /// abandon the call with only diagnostics filled in.
    #[instrument(target = "twill::compile", skip(self, user), fields(len = template.len()))]
    pub fn compile(&self, template: &str, user: Option<&CompilerOptions>) -> CompiledResult {
        let opts = FinalOptions::merge(&self.base, user);
        let leading = template.len() - template.trim_start().len();
        let mut sink = DiagnosticSink::new(opts.output_source_range).with_leading_offset(leading);

        if !opts.validate(&mut sink) {
            let (errors, tips) = sink.into_parts();
            debug!(target: "twill::compile", errors = errors.len(), "compile abandoned");
            return CompiledResult {
                errors,
                tips,
                ..Default::default()
            };
        }

        let output = self.pipeline.run(template.trim(), &opts, &mut sink);
        if cfg!(debug_assertions) {
            if let Some(ast) = &output.ast {
                detect(ast, &opts, &mut sink);
            }
        }

        let (errors, tips) = sink.into_parts();
        debug!(
            target: "twill::compile",
            errors = errors.len(),
            tips = tips.len(),
            statics = output.static_render_sources.len(),
            "compile finished"
        );
        CompiledResult {
            ast: output.ast,
            render_source: output.render_source,
            static_render_sources: output.static_render_sources,
            errors,
            tips,
        }
    }
}
