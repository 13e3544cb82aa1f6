//! Expression review for compiled templates.
//!
//! Generation never evaluates binding expressions, so a typo only shows up
//! at render time as a silently missing value. This pass walks the tree
//! after generation and reports bindings that can never resolve. It runs
//! in debug builds only; release builds skip the walk entirely.

use tracing::{debug, instrument};

use crate::ast::{Ast, Element, NodeId, NodeKind};
use crate::diag::{DiagnosticSink, Span};
use crate::options::FinalOptions;
use crate::runtime::{is_valid_path, path_root};

/// Words with meaning in the template language; a binding cannot start
/// with one.
const RESERVED: &[&str] = &[
    "if", "elif", "else", "for", "in", "of", "let", "fn", "loop", "while", "match", "return",
    "true", "false", "null",
];

/// Tags whose content is executed rather than rendered.
const SIDE_EFFECT_TAGS: &[&str] = &["script", "style"];

#[instrument(target = "twill::detect", skip_all, fields(nodes = ast.len()))]
pub fn detect(ast: &Ast, opts: &FinalOptions, sink: &mut DiagnosticSink) {
    let before = sink.error_count() + sink.tip_count();
    for id in ast.ids() {
        match &ast.node(id).kind {
            NodeKind::Element(el) => check_element(ast, id, el, opts, sink),
            NodeKind::Interpolation(i) => {
                check_expr(&i.expr, ast.node(id).span, sink);
            }
            NodeKind::Text(_) | NodeKind::Comment(_) => {}
        }
    }
    debug!(
        target: "twill::detect",
        found = sink.error_count() + sink.tip_count() - before,
        "detect finished"
    );
}

fn check_element(
    ast: &Ast,
    id: NodeId,
    el: &Element,
    opts: &FinalOptions,
    sink: &mut DiagnosticSink,
) {
    let span = ast.node(id).span;
    if SIDE_EFFECT_TAGS.contains(&el.tag.as_str()) {
        sink.error(
            format!("avoid <{}> in templates; side-effect tags are not executed", el.tag),
            span,
        );
    }
    for attr in &el.bound {
        check_expr(&attr.value, attr.span.or(span), sink);
    }
    for branch in &el.branches {
        if let Some(cond) = &branch.condition {
            check_expr(cond, span, sink);
        }
    }
    if let Some(repeat) = &el.repeat {
        check_expr(&repeat.expr, span, sink);
        for alias in std::iter::once(&repeat.value).chain(repeat.index.as_ref()) {
            if RESERVED.contains(&alias.as_str()) {
                sink.error(
                    format!("`{alias}` is a reserved word; pick another loop binding"),
                    span,
                );
            }
        }
    }
    for d in &el.directives {
        if !opts.knows_directive(&d.name) {
            sink.tip(format!("unknown directive t-{}", d.name), d.span.or(span));
        }
    }
}

fn check_expr(expr: &str, span: Option<Span>, sink: &mut DiagnosticSink) {
    let root = path_root(expr);
    if RESERVED.contains(&root) {
        sink.error(
            format!("`{root}` is a reserved word; it cannot start the binding `{expr}`"),
            span,
        );
        return;
    }
    if !is_valid_path(expr) {
        sink.error(format!("invalid binding expression `{expr}`"), span);
    }
}
