//! Compiler options and per-call merging.
//!
//! A platform instantiates the compiler once with [`BaseOptions`]; every
//! compile call may layer [`CompilerOptions`] on top. Merging builds a
//! fresh [`FinalOptions`] and never touches the shared base, so concurrent
//! calls with different overrides cannot observe each other.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use twill_config::{Delimiters, Limits};

use crate::ast::{DirectiveUse, Element};
use crate::diag::DiagnosticSink;
use crate::runtime::Program;

/// Platform predicate over tag names.
pub type TagPredicate = fn(&str) -> bool;
/// Maps a tag to its namespace, if any.
pub type NamespaceFn = fn(&str) -> Option<&'static str>;
/// Whether a bound attribute must be forwarded as a property,
/// `(tag, attr) -> bool`.
pub type PropPredicate = fn(&str, &str) -> bool;

/// A platform transform pass. `transform_element` runs when the parser
/// closes an element, `gen_data` contributes element ops during code
/// generation. Modules run in merged order in both hooks.
pub trait TransformModule: Send + Sync {
    fn name(&self) -> &'static str;

    fn transform_element(&self, _el: &mut Element, _sink: &mut DiagnosticSink) {}

    fn gen_data(&self, _el: &Element, _program: &mut Program) {}

    /// Extras keys this module writes whose values never depend on scope
    /// data. Anything else in `extras` keeps the element dynamic.
    fn static_extras(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Code generation hook for a directive. Handlers append ops for the
/// element currently being generated.
pub type DirectiveHandler =
    Arc<dyn Fn(&Element, &DirectiveUse, &mut Program, &mut DiagnosticSink) + Send + Sync>;

fn no_tag(_: &str) -> bool {
    false
}

fn no_namespace(_: &str) -> Option<&'static str> {
    None
}

fn no_prop(_: &str, _: &str) -> bool {
    false
}

/// Shared platform configuration a compiler instance is built around.
#[derive(Clone)]
pub struct BaseOptions {
    /// Transform passes, applied in order.
    pub modules: Vec<Arc<dyn TransformModule>>,
    /// Directive code generation hooks by directive name.
    pub directives: HashMap<String, DirectiveHandler>,
    pub is_reserved_tag: TagPredicate,
    /// Tags with no content model, closed implicitly.
    pub is_void_tag: TagPredicate,
    /// Tags whose text content keeps its whitespace.
    pub is_pre_tag: TagPredicate,
    pub must_use_prop: PropPredicate,
    pub get_tag_namespace: NamespaceFn,
    pub delimiters: Delimiters,
    /// Keep comment nodes in the output.
    pub comments: bool,
    /// Attach source ranges to diagnostics.
    pub output_source_range: bool,
    /// Run the static optimizer.
    pub optimize: bool,
    pub limits: Limits,
}

impl Default for BaseOptions {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
            directives: HashMap::new(),
            is_reserved_tag: no_tag,
            is_void_tag: no_tag,
            is_pre_tag: no_tag,
            must_use_prop: no_prop,
            get_tag_namespace: no_namespace,
            delimiters: Delimiters::default(),
            comments: false,
            output_source_range: false,
            optimize: true,
            limits: Limits::default(),
        }
    }
}

impl fmt::Debug for BaseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseOptions")
            .field("modules", &module_names(&self.modules))
            .field("directives", &directive_names(&self.directives))
            .field("delimiters", &self.delimiters)
            .field("comments", &self.comments)
            .field("output_source_range", &self.output_source_range)
            .field("optimize", &self.optimize)
            .field("limits", &self.limits)
            .finish()
    }
}

/// Per-call overrides. Every field is optional; modules append after the
/// base's, directives shadow same-named base entries.
#[derive(Clone, Default)]
pub struct CompilerOptions {
    pub modules: Vec<Arc<dyn TransformModule>>,
    pub directives: HashMap<String, DirectiveHandler>,
    pub delimiters: Option<Delimiters>,
    pub comments: Option<bool>,
    pub output_source_range: Option<bool>,
    pub optimize: Option<bool>,
    pub limits: Option<Limits>,
    pub is_reserved_tag: Option<TagPredicate>,
    pub is_void_tag: Option<TagPredicate>,
    pub is_pre_tag: Option<TagPredicate>,
    pub must_use_prop: Option<PropPredicate>,
    pub get_tag_namespace: Option<NamespaceFn>,
}

impl fmt::Debug for CompilerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerOptions")
            .field("modules", &module_names(&self.modules))
            .field("directives", &directive_names(&self.directives))
            .field("delimiters", &self.delimiters)
            .field("comments", &self.comments)
            .field("output_source_range", &self.output_source_range)
            .field("optimize", &self.optimize)
            .field("limits", &self.limits)
            .finish()
    }
}

/// The merged view one compile call runs with.
///
/// Scalars are resolved copies; directives resolve through a two-level
/// lookup so the base's handler table is shared, never duplicated.
pub struct FinalOptions {
    base: Arc<BaseOptions>,
    /// Base modules first, then per-call modules.
    pub modules: Vec<Arc<dyn TransformModule>>,
    directive_overrides: HashMap<String, DirectiveHandler>,
    pub delimiters: Delimiters,
    pub comments: bool,
    pub output_source_range: bool,
    pub optimize: bool,
    pub limits: Limits,
    pub is_reserved_tag: TagPredicate,
    pub is_void_tag: TagPredicate,
    pub is_pre_tag: TagPredicate,
    pub must_use_prop: PropPredicate,
    pub get_tag_namespace: NamespaceFn,
}

impl FinalOptions {
    pub fn merge(base: &Arc<BaseOptions>, user: Option<&CompilerOptions>) -> Self {
        let mut modules = base.modules.clone();
        let mut directive_overrides = HashMap::new();
        let mut merged = Self {
            base: Arc::clone(base),
            modules: Vec::new(),
            directive_overrides: HashMap::new(),
            delimiters: base.delimiters.clone(),
            comments: base.comments,
            output_source_range: base.output_source_range,
            optimize: base.optimize,
            limits: base.limits,
            is_reserved_tag: base.is_reserved_tag,
            is_void_tag: base.is_void_tag,
            is_pre_tag: base.is_pre_tag,
            must_use_prop: base.must_use_prop,
            get_tag_namespace: base.get_tag_namespace,
        };
        if let Some(user) = user {
            modules.extend(user.modules.iter().cloned());
            directive_overrides.extend(
                user.directives
                    .iter()
                    .map(|(k, v)| (k.clone(), Arc::clone(v))),
            );
            if let Some(d) = &user.delimiters {
                merged.delimiters = d.clone();
            }
            if let Some(v) = user.comments {
                merged.comments = v;
            }
            if let Some(v) = user.output_source_range {
                merged.output_source_range = v;
            }
            if let Some(v) = user.optimize {
                merged.optimize = v;
            }
            if let Some(v) = user.limits {
                merged.limits = v;
            }
            if let Some(v) = user.is_reserved_tag {
                merged.is_reserved_tag = v;
            }
            if let Some(v) = user.is_void_tag {
                merged.is_void_tag = v;
            }
            if let Some(v) = user.is_pre_tag {
                merged.is_pre_tag = v;
            }
            if let Some(v) = user.must_use_prop {
                merged.must_use_prop = v;
            }
            if let Some(v) = user.get_tag_namespace {
                merged.get_tag_namespace = v;
            }
        }
        merged.modules = modules;
        merged.directive_overrides = directive_overrides;
        merged
    }

    /// Resolve a directive handler: the per-call layer shadows the base.
    pub fn directive(&self, name: &str) -> Option<&DirectiveHandler> {
        self.directive_overrides
            .get(name)
            .or_else(|| self.base.directives.get(name))
    }

    pub fn knows_directive(&self, name: &str) -> bool {
        self.directive(name).is_some()
    }

    /// Check the merged configuration. Problems are reported through the
    /// sink as errors; a `false` return means the compile call must be
    /// abandoned before running the pipeline.
    pub fn validate(&self, sink: &mut DiagnosticSink) -> bool {
        let mut ok = true;
        if !self.delimiters.is_valid() {
            sink.error(
                "interpolation delimiters must be non-empty and distinct",
                None,
            );
            ok = false;
        }
        if self.limits.max_depth == 0 {
            sink.error("nesting depth limit must be greater than zero", None);
            ok = false;
        }
        ok
    }
}

impl fmt::Debug for FinalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinalOptions")
            .field("modules", &module_names(&self.modules))
            .field(
                "directive_overrides",
                &directive_names(&self.directive_overrides),
            )
            .field("delimiters", &self.delimiters)
            .field("comments", &self.comments)
            .field("output_source_range", &self.output_source_range)
            .field("optimize", &self.optimize)
            .field("limits", &self.limits)
            .finish()
    }
}

fn module_names(modules: &[Arc<dyn TransformModule>]) -> Vec<&'static str> {
    modules.iter().map(|m| m.name()).collect()
}

fn directive_names(directives: &HashMap<String, DirectiveHandler>) -> Vec<&str> {
    let mut names: Vec<&str> = directives.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}
