//! Twill Core - Template compiler (pure logic, no IO)
//!
//! Contains the markup parser, static optimizer, code generator and the
//! render-program runtime. Only operates on in-memory data structures,
//! no file IO or terminal output.
//!
//! Configuration is passed explicitly via parameters, not via global state.

pub mod ast;
pub mod codegen;
pub mod compile;
pub mod detector;
pub mod diag;
pub mod optimizer;
pub mod options;
pub mod parser;
pub mod runtime;
pub mod to_function;

// Re-export common types
pub use ast::Ast;
pub use compile::{CompiledResult, Compiler, DefaultPipeline, Pipeline, PipelineOutput};
pub use diag::{Diagnostic, DiagnosticSink, Severity, Span};
pub use options::{
    BaseOptions, CompilerOptions, DirectiveHandler, FinalOptions, TransformModule,
};
pub use runtime::{Program, ProgramError, RenderOp, Renderer, Scope, VNode};
pub use to_function::{CompiledFunctions, RenderFn};

// Re-export config types from twill-config
pub use twill_config::{Delimiters, Limits, Phase};
