//! Template parsing.
//!
//! Turns template text into the annotated tree: a markup scan feeds a tree
//! builder that lifts structural directives (`t-if`/`t-elif`/`t-else`,
//! `t-for`), bound attributes (`:name`) and plain directives (`t-name`)
//! off the attribute list, splits interpolations, and enforces the
//! single-root rule. Malformed input is reported through the sink and
//! parsing continues with a best-effort tree.

mod markup;
mod text;

use tracing::{debug, instrument};

use crate::ast::{
    Ast, Attr, Branch, CommentNode, DirectiveUse, Element, Interpolation, NodeId, NodeKind,
    Repeat, TextNode,
};
use crate::diag::{DiagnosticSink, Span};
use crate::options::FinalOptions;

use markup::{MarkupEvent, MarkupScanner, RawAttr, StartTag};
use text::{split_text, TextSegment};

/// Parse a trimmed template into a tree. Never fails; problems surface as
/// diagnostics and the tree holds whatever could be built.
#[instrument(target = "twill::parse", skip_all, fields(len = template.len()))]
pub fn parse(template: &str, opts: &FinalOptions, sink: &mut DiagnosticSink) -> Ast {
    let mut scanner = MarkupScanner::new(template);
    let mut builder = TreeBuilder::new(opts);
    while let Some(event) = scanner.next_event() {
        match event {
            Ok(ev) => builder.handle(ev, sink),
            Err(err) => sink.error(err.to_string(), Some(err.span)),
        }
    }
    let ast = builder.finish(sink);
    debug!(
        target: "twill::parse",
        nodes = ast.len(),
        errors = sink.error_count(),
        "parse finished"
    );
    ast
}

struct TreeBuilder<'o> {
    opts: &'o FinalOptions,
    ast: Ast,
    /// Open elements, innermost last.
    stack: Vec<NodeId>,
    /// Nesting count of `t-pre` carriers currently open.
    pre_depth: usize,
    /// Nesting count of whitespace-preserving tags currently open.
    pre_tag_depth: usize,
    /// When non-zero, events are dropped until the over-deep subtree ends.
    skip_depth: usize,
    depth_error_emitted: bool,
}

impl<'o> TreeBuilder<'o> {
    fn new(opts: &'o FinalOptions) -> Self {
        Self {
            opts,
            ast: Ast::new(),
            stack: Vec::new(),
            pre_depth: 0,
            pre_tag_depth: 0,
            skip_depth: 0,
            depth_error_emitted: false,
        }
    }

    fn handle(&mut self, event: MarkupEvent, sink: &mut DiagnosticSink) {
        match event {
            MarkupEvent::Start(tag) => self.handle_start(tag, sink),
            MarkupEvent::End { tag, span } => self.handle_end(&tag, span, sink),
            MarkupEvent::Text { text, span } => self.handle_text(&text, span, sink),
            MarkupEvent::Comment { text, span } => self.handle_comment(text, span),
        }
    }

    fn handle_start(&mut self, tag: StartTag, sink: &mut DiagnosticSink) {
        let closes_itself = tag.self_closing || (self.opts.is_void_tag)(&tag.tag);
        if self.skip_depth > 0 {
            if !closes_itself {
                self.skip_depth += 1;
            }
            return;
        }
        if self.stack.len() >= self.opts.limits.max_depth {
            if !self.depth_error_emitted {
                sink.error(
                    format!(
                        "element nesting exceeds the depth limit of {}",
                        self.opts.limits.max_depth
                    ),
                    Some(tag.span),
                );
                self.depth_error_emitted = true;
            }
            if !closes_itself {
                self.skip_depth = 1;
            }
            return;
        }

        let span = tag.span;
        let tag_name = tag.tag;
        let attrs = dedupe_attrs(tag.attrs, sink);

        let mut el = Element::new(tag_name.clone());
        el.ns = self
            .parent_ns()
            .or_else(|| (self.opts.get_tag_namespace)(&tag_name).map(str::to_string));

        let pre_carrier = attrs.iter().any(|a| a.name == "t-pre");
        el.pre = pre_carrier;
        let mut if_expr = None;
        if pre_carrier || self.pre_depth > 0 {
            // Inside t-pre everything stays literal.
            for a in attrs {
                if a.name == "t-pre" {
                    continue;
                }
                el.attrs.push(Attr {
                    name: a.name,
                    value: a.value,
                    span: Some(a.span),
                });
            }
        } else {
            if_expr = lift_attrs(&mut el, attrs, sink);
        }
        let elif_expr = el.elif_expr.clone();
        let is_else = el.is_else;
        let pre_tag = (self.opts.is_pre_tag)(&tag_name);

        let id = self.ast.alloc(NodeKind::Element(el), None, Some(span));

        if let Some(cond) = if_expr {
            if let Some(head) = self.ast.element_mut(id) {
                head.branches.push(Branch {
                    condition: Some(cond),
                    node: id,
                });
            }
            self.attach_child(id, sink);
        } else if elif_expr.is_some() || is_else {
            self.attach_branch(id, elif_expr, sink);
        } else {
            self.attach_child(id, sink);
        }

        if closes_itself {
            self.close_element(id, sink);
        } else {
            self.stack.push(id);
            if pre_carrier {
                self.pre_depth += 1;
            }
            if pre_tag {
                self.pre_tag_depth += 1;
            }
        }
    }

    fn handle_end(&mut self, tag: &str, span: Span, sink: &mut DiagnosticSink) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return;
        }
        let matched = self
            .stack
            .iter()
            .rposition(|&id| self.ast.element(id).map(|el| el.tag == tag).unwrap_or(false));
        match matched {
            Some(pos) => {
                // Anything still open above the match was never closed.
                while self.stack.len() > pos + 1 {
                    self.report_unclosed_top(sink);
                    self.pop_close(sink);
                }
                if let Some(&id) = self.stack.last() {
                    if let Some(s) = &mut self.ast.node_mut(id).span {
                        s.end = span.end;
                    }
                }
                self.pop_close(sink);
            }
            None => sink.error(
                format!("end tag </{tag}> has no matching start tag"),
                Some(span),
            ),
        }
    }

    fn handle_text(&mut self, text: &str, span: Span, sink: &mut DiagnosticSink) {
        if self.skip_depth > 0 {
            return;
        }
        if self.stack.is_empty() {
            if !text.trim().is_empty() {
                sink.error(
                    format!(
                        "text \"{}\" outside the root element will be ignored",
                        text.trim()
                    ),
                    Some(span),
                );
            }
            return;
        }
        if text.trim().is_empty() {
            // Whitespace-only runs survive only inside whitespace-preserving
            // tags.
            if self.pre_tag_depth > 0 {
                self.push_text(text.to_string(), span);
            }
            return;
        }
        if self.pre_depth > 0 {
            self.push_text(text.to_string(), span);
            return;
        }
        let open = self.opts.delimiters.open.clone();
        let close = self.opts.delimiters.close.clone();
        match split_text(text, &open, &close) {
            Some(segments) => {
                for seg in segments {
                    match seg {
                        TextSegment::Literal { text, start, len } => {
                            let s = Span::new(span.start + start, span.start + start + len);
                            self.push_text(text, s);
                        }
                        TextSegment::Interp {
                            expr,
                            raw,
                            start,
                            len,
                        } => {
                            let s = Span::new(span.start + start, span.start + start + len);
                            self.push_node(
                                NodeKind::Interpolation(Interpolation { expr, raw }),
                                s,
                            );
                        }
                    }
                }
            }
            None => self.push_text(text.to_string(), span),
        }
    }

    fn handle_comment(&mut self, text: String, span: Span) {
        if self.skip_depth > 0 || !self.opts.comments || self.stack.is_empty() {
            return;
        }
        self.push_node(NodeKind::Comment(CommentNode { text }), span);
    }

    fn finish(mut self, sink: &mut DiagnosticSink) -> Ast {
        while !self.stack.is_empty() {
            self.report_unclosed_top(sink);
            self.pop_close(sink);
        }
        self.ast
    }

    fn parent_ns(&self) -> Option<String> {
        self.stack
            .last()
            .and_then(|&id| self.ast.element(id))
            .and_then(|el| el.ns.clone())
    }

    fn push_text(&mut self, text: String, span: Span) {
        self.push_node(NodeKind::Text(TextNode { text }), span);
    }

    fn push_node(&mut self, kind: NodeKind, span: Span) {
        let parent = self.stack.last().copied();
        let id = self.ast.alloc(kind, parent, Some(span));
        if let Some(parent) = parent {
            if let Some(el) = self.ast.element_mut(parent) {
                el.children.push(id);
            }
        }
    }

    fn attach_child(&mut self, id: NodeId, sink: &mut DiagnosticSink) {
        match self.stack.last().copied() {
            Some(parent) => {
                self.ast.node_mut(id).parent = Some(parent);
                if let Some(el) = self.ast.element_mut(parent) {
                    el.children.push(id);
                }
            }
            None => {
                if self.ast.root.is_none() {
                    self.ast.root = Some(id);
                } else {
                    sink.error(
                        "template should contain exactly one root element; chain conditional \
                         roots with t-elif or t-else",
                        self.ast.node(id).span,
                    );
                }
            }
        }
    }

    /// Attach a `t-elif`/`t-else` element to the chain headed by its
    /// previous sibling. The element never joins a child list; failing to
    /// find a chain head drops it.
    fn attach_branch(&mut self, id: NodeId, condition: Option<String>, sink: &mut DiagnosticSink) {
        let prev = match self.stack.last().copied() {
            Some(parent) => self
                .ast
                .element(parent)
                .and_then(|el| el.children.last().copied()),
            None => self.ast.root,
        };
        let head = prev.filter(|&p| {
            self.ast
                .element(p)
                .map(|el| !el.branches.is_empty())
                .unwrap_or(false)
        });
        match head {
            Some(head_id) => {
                if let Some(head_el) = self.ast.element_mut(head_id) {
                    head_el.branches.push(Branch {
                        condition,
                        node: id,
                    });
                }
            }
            None => {
                let (marker, tag) = {
                    let node = self.ast.node(id);
                    let tag = match &node.kind {
                        NodeKind::Element(el) => el.tag.clone(),
                        _ => String::new(),
                    };
                    let marker = match &node.kind {
                        NodeKind::Element(el) if el.is_else => "t-else",
                        _ => "t-elif",
                    };
                    (marker, tag)
                };
                sink.error(
                    format!("{marker} used on element <{tag}> without a matching t-if"),
                    self.ast.node(id).span,
                );
            }
        }
    }

    fn report_unclosed_top(&mut self, sink: &mut DiagnosticSink) {
        if let Some(&id) = self.stack.last() {
            let tag = self
                .ast
                .element(id)
                .map(|el| el.tag.clone())
                .unwrap_or_default();
            sink.error(
                format!("tag <{tag}> has no matching end tag"),
                self.ast.node(id).span,
            );
        }
    }

    fn pop_close(&mut self, sink: &mut DiagnosticSink) {
        if let Some(id) = self.stack.pop() {
            self.close_element(id, sink);
            let (pre_carrier, pre_tag) = match self.ast.element(id) {
                Some(el) => (el.pre, (self.opts.is_pre_tag)(&el.tag)),
                None => (false, false),
            };
            if pre_carrier && self.pre_depth > 0 {
                self.pre_depth -= 1;
            }
            if pre_tag && self.pre_tag_depth > 0 {
                self.pre_tag_depth -= 1;
            }
        }
    }

    /// Runs when an element is complete. Transform modules see the element
    /// in merged order; t-pre contents are exempt.
    fn close_element(&mut self, id: NodeId, sink: &mut DiagnosticSink) {
        if self.pre_depth > 0 {
            return;
        }
        let modules = self.opts.modules.clone();
        if let Some(el) = self.ast.element_mut(id) {
            for module in &modules {
                module.transform_element(el, sink);
            }
        }
    }
}

/// Drop repeated attribute names, keeping the first occurrence.
fn dedupe_attrs(attrs: Vec<RawAttr>, sink: &mut DiagnosticSink) -> Vec<RawAttr> {
    let mut seen: Vec<&str> = Vec::new();
    let mut out: Vec<RawAttr> = Vec::new();
    for attr in &attrs {
        if seen.contains(&attr.name.as_str()) {
            sink.error(
                format!("duplicate attribute `{}`", attr.name),
                Some(attr.span),
            );
        } else {
            seen.push(&attr.name);
            out.push(attr.clone());
        }
    }
    out
}

/// Sort raw attributes into the element's lifted fields. Returns the
/// `t-if` condition when present; `t-elif`/`t-else` markers are recorded
/// on the element for the builder to resolve against siblings.
fn lift_attrs(el: &mut Element, attrs: Vec<RawAttr>, sink: &mut DiagnosticSink) -> Option<String> {
    let mut if_expr = None;
    for a in attrs {
        if let Some(name) = a.name.strip_prefix(':') {
            if name.is_empty() {
                sink.error("bound attribute is missing a name", Some(a.span));
                continue;
            }
            el.bound.push(Attr {
                name: name.to_string(),
                value: a.value,
                span: Some(a.span),
            });
        } else if let Some(rest) = a.name.strip_prefix("t-") {
            let rest = rest.to_string();
            lift_directive(el, &rest, a, &mut if_expr, sink);
        } else {
            el.attrs.push(Attr {
                name: a.name,
                value: a.value,
                span: Some(a.span),
            });
        }
    }
    if_expr
}

fn lift_directive(
    el: &mut Element,
    rest: &str,
    attr: RawAttr,
    if_expr: &mut Option<String>,
    sink: &mut DiagnosticSink,
) {
    match rest {
        "if" | "elif" => {
            let expr = attr.value.trim();
            if expr.is_empty() {
                sink.error(format!("t-{rest} requires an expression"), Some(attr.span));
                return;
            }
            if rest == "if" {
                *if_expr = Some(expr.to_string());
            } else {
                el.elif_expr = Some(expr.to_string());
            }
        }
        "else" => el.is_else = true,
        "for" => match parse_repeat(&attr.value) {
            Ok(repeat) => el.repeat = Some(repeat),
            Err(reason) => sink.error(
                format!("invalid t-for expression `{}`: {reason}", attr.value.trim()),
                Some(attr.span),
            ),
        },
        "pre" => el.pre = true,
        "" => sink.error("directive is missing a name", Some(attr.span)),
        name => {
            let (name, arg) = match name.split_once(':') {
                Some((n, a)) => (n.to_string(), Some(a.to_string())),
                None => (name.to_string(), None),
            };
            el.directives.push(DirectiveUse {
                name,
                arg,
                expr: attr.value,
                span: Some(attr.span),
            });
        }
    }
}

/// Parse a `t-for` value: `item in items`, `(item, i) in items`. `of` is
/// accepted as a synonym for `in`.
fn parse_repeat(source: &str) -> Result<Repeat, String> {
    let in_at = source.find(" in ");
    let of_at = source.find(" of ");
    let split_at = match (in_at, of_at) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return Err("expected `in` or `of`".to_string()),
    };
    let alias_part = source[..split_at].trim();
    let expr = source[split_at + 4..].trim();
    if expr.is_empty() {
        return Err("missing iterated expression".to_string());
    }
    if alias_part.is_empty() {
        return Err("missing item binding".to_string());
    }

    let inner = alias_part
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(alias_part);
    let mut names = inner.split(',').map(str::trim);
    let value = match names.next() {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => return Err("missing item binding".to_string()),
    };
    let index = match names.next() {
        Some(i) if !i.is_empty() => Some(i.to_string()),
        Some(_) => return Err("empty position binding".to_string()),
        None => None,
    };
    if names.next().is_some() {
        return Err("at most two bindings are supported".to_string());
    }
    Ok(Repeat {
        expr: expr.to_string(),
        value,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{BaseOptions, CompilerOptions, FinalOptions};
    use std::sync::Arc;
    use twill_config::{Delimiters, Limits};

    fn options() -> FinalOptions {
        FinalOptions::merge(&Arc::new(BaseOptions::default()), None)
    }

    fn options_with(user: CompilerOptions) -> FinalOptions {
        FinalOptions::merge(&Arc::new(BaseOptions::default()), Some(&user))
    }

    fn parse_ok(template: &str) -> Ast {
        let opts = options();
        let mut sink = DiagnosticSink::new(true);
        let ast = parse(template, &opts, &mut sink);
        let (errors, _) = sink.into_parts();
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        ast
    }

    fn parse_with(template: &str, opts: &FinalOptions) -> (Ast, Vec<crate::diag::Diagnostic>) {
        let mut sink = DiagnosticSink::new(true);
        let ast = parse(template, opts, &mut sink);
        let (errors, _) = sink.into_parts();
        (ast, errors)
    }

    fn first_error(template: &str) -> String {
        let opts = options();
        let (_, errors) = parse_with(template, &opts);
        assert!(!errors.is_empty(), "expected an error for {template:?}");
        errors[0].message.clone()
    }

    #[test]
    fn test_parse_single_root() {
        let ast = parse_ok("<div><span>hi</span></div>");
        let root = ast.root.unwrap();
        let root_el = ast.element(root).unwrap();
        assert_eq!(root_el.tag, "div");
        assert_eq!(root_el.children.len(), 1);
        let span_el = ast.element(root_el.children[0]).unwrap();
        assert_eq!(span_el.tag, "span");
        assert_eq!(ast.node(root_el.children[0]).parent, Some(root));
    }

    #[test]
    fn test_text_and_interpolation_split() {
        let ast = parse_ok("<p>hello {{ name }}!</p>");
        let root = ast.root.unwrap();
        let children = &ast.element(root).unwrap().children;
        assert_eq!(children.len(), 3);
        match &ast.node(children[1]).kind {
            NodeKind::Interpolation(i) => {
                assert_eq!(i.expr, "name");
                assert_eq!(i.raw, "{{ name }}");
            }
            other => panic!("expected interpolation, got {other:?}"),
        }
        match &ast.node(children[2]).kind {
            NodeKind::Text(t) => assert_eq!(t.text, "!"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_interpolation_span_is_relative_to_template() {
        let ast = parse_ok("<p>ab {{x}}</p>");
        let root = ast.root.unwrap();
        let children = &ast.element(root).unwrap().children;
        let span = ast.node(children[1]).span.unwrap();
        assert_eq!(span, Span::new(6, 11));
    }

    #[test]
    fn test_if_creates_self_branch() {
        let ast = parse_ok(r#"<div t-if="ok">x</div>"#);
        let root = ast.root.unwrap();
        let el = ast.element(root).unwrap();
        assert_eq!(el.branches.len(), 1);
        assert_eq!(el.branches[0].condition.as_deref(), Some("ok"));
        assert_eq!(el.branches[0].node, root);
        assert!(el.directives.is_empty());
        assert!(el.attrs.is_empty());
    }

    #[test]
    fn test_elif_else_chain_attaches_to_head() {
        let ast = parse_ok(
            r#"<div><p t-if="a">A</p><p t-elif="b">B</p><p t-else>C</p></div>"#,
        );
        let root = ast.root.unwrap();
        let children = &ast.element(root).unwrap().children;
        // Only the chain head is a child.
        assert_eq!(children.len(), 1);
        let head = ast.element(children[0]).unwrap();
        assert_eq!(head.branches.len(), 3);
        assert_eq!(head.branches[1].condition.as_deref(), Some("b"));
        assert_eq!(head.branches[2].condition, None);
        // Alternates are not children and carry no parent.
        let alt = head.branches[2].node;
        assert_eq!(ast.node(alt).parent, None);
    }

    #[test]
    fn test_elif_without_if_is_reported() {
        let message = first_error(r#"<div><p t-elif="b">B</p></div>"#);
        assert!(message.contains("t-elif"), "got: {message}");
        assert!(message.contains("without a matching t-if"), "got: {message}");
    }

    #[test]
    fn test_root_level_chain_is_one_root() {
        let ast = parse_ok(r#"<p t-if="a">A</p><p t-else>B</p>"#);
        let root = ast.root.unwrap();
        assert_eq!(ast.element(root).unwrap().branches.len(), 2);
    }

    #[test]
    fn test_for_binding_forms() {
        let ast = parse_ok(r#"<ul><li t-for="item in items">x</li></ul>"#);
        let root = ast.root.unwrap();
        let li = ast.element(ast.element(root).unwrap().children[0]).unwrap();
        let repeat = li.repeat.as_ref().unwrap();
        assert_eq!(repeat.expr, "items");
        assert_eq!(repeat.value, "item");
        assert_eq!(repeat.index, None);

        let ast = parse_ok(r#"<ul><li t-for="(item, i) of list.rows">x</li></ul>"#);
        let root = ast.root.unwrap();
        let li = ast.element(ast.element(root).unwrap().children[0]).unwrap();
        let repeat = li.repeat.as_ref().unwrap();
        assert_eq!(repeat.expr, "list.rows");
        assert_eq!(repeat.value, "item");
        assert_eq!(repeat.index.as_deref(), Some("i"));
    }

    #[test]
    fn test_invalid_for_is_reported() {
        let message = first_error(r#"<li t-for="items">x</li>"#);
        assert!(message.contains("invalid t-for"), "got: {message}");
    }

    #[test]
    fn test_bound_attrs_and_directives_are_lifted() {
        let ast = parse_ok(r#"<div :class="cls" t-text="msg" t-bindattr:title="t" id="a"></div>"#);
        let el = ast.element(ast.root.unwrap()).unwrap();
        assert_eq!(el.bound.len(), 1);
        assert_eq!(el.bound[0].name, "class");
        assert_eq!(el.bound[0].value, "cls");
        assert_eq!(el.directives.len(), 2);
        assert_eq!(el.directives[0].name, "text");
        assert_eq!(el.directives[1].name, "bindattr");
        assert_eq!(el.directives[1].arg.as_deref(), Some("title"));
        assert_eq!(el.attrs.len(), 1);
        assert_eq!(el.attrs[0].name, "id");
    }

    #[test]
    fn test_duplicate_attribute_is_reported() {
        let message = first_error(r#"<div id="a" id="b"></div>"#);
        assert!(message.contains("duplicate attribute"), "got: {message}");
    }

    #[test]
    fn test_unclosed_tag_is_reported_with_partial_tree() {
        let opts = options();
        let (ast, errors) = parse_with("<div><span>hi</div>", &opts);
        assert!(errors[0].message.contains("<span>"), "got: {errors:?}");
        // The tree still holds both elements.
        let root = ast.root.unwrap();
        assert_eq!(ast.element(root).unwrap().tag, "div");
        assert_eq!(ast.element(root).unwrap().children.len(), 1);
    }

    #[test]
    fn test_stray_end_tag_is_reported() {
        let message = first_error("<div></p></div>");
        assert!(message.contains("</p>"), "got: {message}");
    }

    #[test]
    fn test_multiple_roots_reported_and_first_kept() {
        let opts = options();
        let (ast, errors) = parse_with("<div>a</div><p>b</p>", &opts);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("exactly one root"));
        assert_eq!(ast.element(ast.root.unwrap()).unwrap().tag, "div");
    }

    #[test]
    fn test_text_outside_root_is_reported() {
        let message = first_error("<div>a</div>tail");
        assert!(message.contains("outside the root"), "got: {message}");
    }

    #[test]
    fn test_whitespace_between_elements_is_dropped() {
        let ast = parse_ok("<div>\n  <span>a</span>\n  <span>b</span>\n</div>");
        let root = ast.root.unwrap();
        assert_eq!(ast.element(root).unwrap().children.len(), 2);
    }

    #[test]
    fn test_whitespace_kept_inside_pre_tags() {
        fn pre_tag(tag: &str) -> bool {
            tag == "pre"
        }
        let opts = options_with(CompilerOptions {
            is_pre_tag: Some(pre_tag),
            ..Default::default()
        });
        let (ast, errors) = parse_with("<pre>  \n  </pre>", &opts);
        assert!(errors.is_empty());
        let root = ast.root.unwrap();
        let children = &ast.element(root).unwrap().children;
        assert_eq!(children.len(), 1);
        assert!(matches!(&ast.node(children[0]).kind, NodeKind::Text(t) if t.text == "  \n  "));
    }

    #[test]
    fn test_pre_block_keeps_contents_literal() {
        let ast = parse_ok(r#"<div t-pre><span :class="c">{{ raw }}</span></div>"#);
        let root = ast.root.unwrap();
        let root_el = ast.element(root).unwrap();
        assert!(root_el.pre);
        let span_el = ast.element(root_el.children[0]).unwrap();
        // The binding stays a literal attribute.
        assert!(span_el.bound.is_empty());
        assert_eq!(span_el.attrs[0].name, ":class");
        match &ast.node(span_el.children[0]).kind {
            NodeKind::Text(t) => assert_eq!(t.text, "{{ raw }}"),
            other => panic!("expected literal text, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_limit_reports_once_and_drops_subtree() {
        let opts = options_with(CompilerOptions {
            limits: Some(Limits { max_depth: 2 }),
            ..Default::default()
        });
        let (ast, errors) = parse_with(
            "<div><p><span><b>deep</b></span></p><p>ok</p></div>",
            &opts,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("depth limit"));
        let root = ast.root.unwrap();
        let p = ast.element(ast.element(root).unwrap().children[0]).unwrap();
        // The over-deep span subtree is gone, the later sibling is intact.
        assert!(p.children.is_empty());
        assert_eq!(ast.element(root).unwrap().children.len(), 2);
    }

    #[test]
    fn test_comments_dropped_by_default_kept_on_request() {
        let ast = parse_ok("<div><!-- note --></div>");
        assert!(ast.element(ast.root.unwrap()).unwrap().children.is_empty());

        let opts = options_with(CompilerOptions {
            comments: Some(true),
            ..Default::default()
        });
        let (ast, errors) = parse_with("<div><!-- note --></div>", &opts);
        assert!(errors.is_empty());
        let children = &ast.element(ast.root.unwrap()).unwrap().children;
        assert_eq!(children.len(), 1);
        assert!(matches!(&ast.node(children[0]).kind, NodeKind::Comment(c) if c.text == " note "));
    }

    #[test]
    fn test_custom_delimiters() {
        let opts = options_with(CompilerOptions {
            delimiters: Some(Delimiters::new("[[", "]]")),
            ..Default::default()
        });
        let (ast, errors) = parse_with("<p>[[ x ]] and {{ y }}</p>", &opts);
        assert!(errors.is_empty());
        let children = &ast.element(ast.root.unwrap()).unwrap().children;
        assert!(matches!(&ast.node(children[0]).kind, NodeKind::Interpolation(i) if i.expr == "x"));
        assert!(
            matches!(&ast.node(children[1]).kind, NodeKind::Text(t) if t.text == " and {{ y }}")
        );
    }

    #[test]
    fn test_namespace_is_inherited() {
        fn ns(tag: &str) -> Option<&'static str> {
            (tag == "svg").then_some("svg")
        }
        let opts = options_with(CompilerOptions {
            get_tag_namespace: Some(ns),
            ..Default::default()
        });
        let (ast, errors) = parse_with("<svg><circle></circle></svg>", &opts);
        assert!(errors.is_empty());
        let root = ast.root.unwrap();
        let circle = ast.element(ast.element(root).unwrap().children[0]).unwrap();
        assert_eq!(circle.ns.as_deref(), Some("svg"));
    }

    #[test]
    fn test_void_tags_close_implicitly() {
        fn void(tag: &str) -> bool {
            tag == "br"
        }
        let opts = options_with(CompilerOptions {
            is_void_tag: Some(void),
            ..Default::default()
        });
        let (ast, errors) = parse_with("<div>a<br>b</div>", &opts);
        assert!(errors.is_empty());
        let children = &ast.element(ast.root.unwrap()).unwrap().children;
        assert_eq!(children.len(), 3);
        assert_eq!(ast.element(children[1]).unwrap().tag, "br");
    }

    #[test]
    fn test_parse_repeat_rejects_garbage() {
        assert!(parse_repeat("items").is_err());
        assert!(parse_repeat(" in items").is_err());
        assert!(parse_repeat("x in ").is_err());
        assert!(parse_repeat("(a, b, c, d) in xs").is_err());
        assert!(parse_repeat("(a, ) in xs").is_err());
    }

    #[test]
    fn test_empty_template_has_no_root() {
        let ast = parse_ok("");
        assert!(ast.root.is_none());
    }
}
