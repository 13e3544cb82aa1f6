//! Code generation: annotated tree → render programs.
//!
//! Walks the tree once and emits a flat op listing per
//! [`crate::runtime::Program`]. Static roots elected by the optimizer are
//! generated into a side table of hoisted programs and referenced by
//! index, so the main program only describes the dynamic parts.

use tracing::{debug, instrument};

use crate::ast::{Ast, Element, NodeId, NodeKind};
use crate::diag::DiagnosticSink;
use crate::options::FinalOptions;
use crate::runtime::{Program, RenderOp};

/// The product of one generation pass.
#[derive(Debug, Clone, Default)]
pub struct GeneratedCode {
    pub program: Program,
    /// Hoisted subtrees, indexed by the `static` ops in `program`.
    pub static_programs: Vec<Program>,
}

/// Generate render programs for a parsed (and usually optimized) tree.
/// An empty tree yields an empty program, which renders to nothing.
#[instrument(target = "twill::generate", skip_all, fields(nodes = ast.len()))]
pub fn generate(ast: &Ast, opts: &FinalOptions, sink: &mut DiagnosticSink) -> GeneratedCode {
    let mut generator = Generator {
        ast,
        opts,
        statics: Vec::new(),
    };
    let mut program = Program::new();
    if let Some(root) = ast.root {
        generator.gen_node(root, &mut program, GenFlags::default(), sink);
    }
    let out = GeneratedCode {
        program,
        static_programs: generator.statics,
    };
    debug!(
        target: "twill::generate",
        ops = out.program.len(),
        statics = out.static_programs.len(),
        "generate finished"
    );
    out
}

/// Re-entry guards. A node is re-entered after its repeat or conditional
/// wrapper has been emitted; the flag for the consumed construct stops it
/// from being wrapped twice.
#[derive(Debug, Clone, Copy, Default)]
struct GenFlags {
    skip_static: bool,
    skip_repeat: bool,
    skip_branches: bool,
}

struct Generator<'a> {
    ast: &'a Ast,
    opts: &'a FinalOptions,
    statics: Vec<Program>,
}

impl<'a> Generator<'a> {
    fn gen_node(
        &mut self,
        id: NodeId,
        program: &mut Program,
        flags: GenFlags,
        sink: &mut DiagnosticSink,
    ) {
        let ast = self.ast;
        let node = ast.node(id);
        if node.static_root && !flags.skip_static {
            self.gen_static(id, program, sink);
            return;
        }
        match &node.kind {
            NodeKind::Element(el) => {
                if el.repeat.is_some() && !flags.skip_repeat {
                    self.gen_repeat(id, el, program, sink);
                } else if !el.branches.is_empty() && !flags.skip_branches {
                    self.gen_branches(id, el, program, sink);
                } else {
                    self.gen_element(el, program, sink);
                }
            }
            NodeKind::Text(t) => program.push(RenderOp::Text {
                text: t.text.clone(),
            }),
            NodeKind::Interpolation(i) => program.push(RenderOp::Interp {
                expr: i.expr.clone(),
            }),
            NodeKind::Comment(c) => program.push(RenderOp::Comment {
                text: c.text.clone(),
            }),
        }
    }

    /// Emit the subtree into a fresh hoisted program and reference it.
    fn gen_static(&mut self, id: NodeId, program: &mut Program, sink: &mut DiagnosticSink) {
        let index = self.statics.len();
        self.statics.push(Program::new());
        let mut hoisted = Program::new();
        let flags = GenFlags {
            skip_static: true,
            ..GenFlags::default()
        };
        self.gen_node(id, &mut hoisted, flags, sink);
        self.statics[index] = hoisted;
        program.push(RenderOp::Static { index });
    }

    fn gen_repeat(
        &mut self,
        id: NodeId,
        el: &Element,
        program: &mut Program,
        sink: &mut DiagnosticSink,
    ) {
        let repeat = match &el.repeat {
            Some(repeat) => repeat,
            None => return,
        };
        program.push(RenderOp::For {
            expr: repeat.expr.clone(),
            value: repeat.value.clone(),
            index: repeat.index.clone(),
        });
        let flags = GenFlags {
            skip_static: true,
            skip_repeat: true,
            skip_branches: false,
        };
        self.gen_node(id, program, flags, sink);
        program.push(RenderOp::End);
    }

    /// Emit a conditional chain. The head element is its own first arm;
    /// alternates generate fresh so their own repeat or hoisting applies.
    fn gen_branches(
        &mut self,
        id: NodeId,
        el: &Element,
        program: &mut Program,
        sink: &mut DiagnosticSink,
    ) {
        for (pos, branch) in el.branches.iter().enumerate() {
            let op = match (&branch.condition, pos) {
                (Some(cond), 0) => RenderOp::If { cond: cond.clone() },
                (Some(cond), _) => RenderOp::Elif { cond: cond.clone() },
                (None, _) => RenderOp::Else,
            };
            program.push(op);
            let flags = if branch.node == id {
                GenFlags {
                    skip_static: true,
                    skip_repeat: true,
                    skip_branches: true,
                }
            } else {
                GenFlags {
                    skip_branches: true,
                    ..GenFlags::default()
                }
            };
            self.gen_node(branch.node, program, flags, sink);
        }
        program.push(RenderOp::End);
    }

    fn gen_element(&mut self, el: &Element, program: &mut Program, sink: &mut DiagnosticSink) {
        let opts = self.opts;
        program.push(RenderOp::Elem {
            tag: el.tag.clone(),
            ns: el.ns.clone(),
        });
        // Directives run first; they may claim the element's content.
        for d in &el.directives {
            if let Some(handler) = opts.directive(&d.name) {
                handler(el, d, program, sink);
            }
        }
        for module in &opts.modules {
            module.gen_data(el, program);
        }
        for attr in &el.attrs {
            program.push(RenderOp::Attr {
                name: attr.name.clone(),
                value: attr.value.clone(),
            });
        }
        for attr in &el.bound {
            let op = if (opts.must_use_prop)(&el.tag, &attr.name) {
                RenderOp::Prop {
                    name: attr.name.clone(),
                    expr: attr.value.clone(),
                }
            } else {
                RenderOp::BoundAttr {
                    name: attr.name.clone(),
                    expr: attr.value.clone(),
                }
            };
            program.push(op);
        }
        for &child in &el.children {
            self.gen_node(child, program, GenFlags::default(), sink);
        }
        program.push(RenderOp::End);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::optimize;
    use crate::options::BaseOptions;
    use crate::parser::parse;
    use std::sync::Arc;

    fn options() -> FinalOptions {
        fn any_tag(_: &str) -> bool {
            true
        }
        let base = BaseOptions {
            is_reserved_tag: any_tag,
            ..Default::default()
        };
        FinalOptions::merge(&Arc::new(base), None)
    }

    fn gen(template: &str) -> GeneratedCode {
        let opts = options();
        let mut sink = DiagnosticSink::new(false);
        let mut ast = parse(template, &opts, &mut sink);
        assert!(!sink.has_errors(), "parse failed for {template:?}");
        optimize(&mut ast, &opts);
        generate(&ast, &opts, &mut sink)
    }

    fn listing(template: &str) -> String {
        gen(template).program.to_string()
    }

    #[test]
    fn test_empty_tree_generates_empty_program() {
        let code = gen("");
        assert!(code.program.is_empty());
        assert!(code.static_programs.is_empty());
    }

    #[test]
    fn test_dynamic_element_listing() {
        let out = listing(r#"<p id="a" :title="t">{{ msg }}</p>"#);
        let expected = "\
elem p
  attr id \"a\"
  battr title \"t\"
  interp \"msg\"
end
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_static_tree_is_hoisted() {
        let code = gen("<div><span>hi</span></div>");
        assert_eq!(code.static_programs.len(), 1);
        assert_eq!(code.program.to_string(), "static 0\n");
        let hoisted = code.static_programs[0].to_string();
        assert!(hoisted.starts_with("elem div"), "got: {hoisted}");
        assert!(hoisted.contains("text \"hi\""), "got: {hoisted}");
    }

    #[test]
    fn test_hoisted_subtree_not_duplicated_in_main() {
        let code = gen("<div>{{ x }}<ul><li>a</li><li>b</li></ul></div>");
        let main = code.program.to_string();
        assert!(main.contains("static 0"), "got: {main}");
        assert!(!main.contains("elem ul"), "got: {main}");
        assert_eq!(code.static_programs.len(), 1);
        assert!(code.static_programs[0].to_string().contains("elem li"));
    }

    #[test]
    fn test_conditional_chain_listing() {
        let out = listing(
            r#"<div><p t-if="a">{{ a }}</p><p t-elif="b">B</p><p t-else>C</p></div>"#,
        );
        assert!(out.contains("if \"a\""), "got: {out}");
        assert!(out.contains("elif \"b\""), "got: {out}");
        assert!(out.contains("else"), "got: {out}");
        assert_eq!(out.matches("elem p").count(), 3, "got: {out}");
    }

    #[test]
    fn test_repeat_wraps_element() {
        let out = listing(r#"<ul><li t-for="(item, i) in items">{{ item }}</li></ul>"#);
        let expected = "\
elem ul
  for \"items\" item i
    elem li
      interp \"item\"
    end
  end
end
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_repeat_with_condition_nests_if_inside_for() {
        let out = listing(r#"<ul><li t-for="x in xs" t-if="x">v</li></ul>"#);
        let for_at = out.find("for ").unwrap();
        let if_at = out.find("if \"x\"").unwrap();
        assert!(for_at < if_at, "got: {out}");
    }

    #[test]
    fn test_static_arm_inside_conditional() {
        let code = gen(r#"<div><p t-if="a">{{ a }}</p><p t-else><b>s</b><b>t</b></p></div>"#);
        let main = code.program.to_string();
        assert!(main.contains("else"), "got: {main}");
        assert!(main.contains("static 0"), "got: {main}");
        assert_eq!(code.static_programs.len(), 1);
    }

    #[test]
    fn test_prop_predicate_routes_bound_attrs() {
        fn value_is_prop(tag: &str, attr: &str) -> bool {
            tag == "input" && attr == "value"
        }
        let base = BaseOptions {
            must_use_prop: value_is_prop,
            ..Default::default()
        };
        let opts = FinalOptions::merge(&Arc::new(base), None);
        let mut sink = DiagnosticSink::new(false);
        let ast = parse(r#"<input :value="v" :title="t"></input>"#, &opts, &mut sink);
        assert!(!sink.has_errors());
        let code = generate(&ast, &opts, &mut sink);
        let out = code.program.to_string();
        assert!(out.contains("prop value \"v\""), "got: {out}");
        assert!(out.contains("battr title \"t\""), "got: {out}");
    }

    #[test]
    fn test_generated_listing_reloads() {
        let code = gen(
            r#"<div :class="c"><p t-if="ok">{{ msg }}</p><ul><li t-for="x in xs">{{ x }}</li></ul></div>"#,
        );
        let reloaded = Program::parse(&code.program.to_string());
        assert!(reloaded.is_ok(), "reload failed: {:?}", reloaded.err());
        assert_eq!(reloaded.unwrap(), code.program);
        for hoisted in &code.static_programs {
            let r = Program::parse(&hoisted.to_string());
            assert!(r.is_ok(), "hoisted reload failed: {:?}", r.err());
        }
    }

    #[test]
    fn test_comment_nodes_emit_when_kept() {
        use crate::options::CompilerOptions;
        let user = CompilerOptions {
            comments: Some(true),
            ..Default::default()
        };
        fn any_tag(_: &str) -> bool {
            true
        }
        let base = BaseOptions {
            is_reserved_tag: any_tag,
            ..Default::default()
        };
        let opts = FinalOptions::merge(&Arc::new(base), Some(&user));
        let mut sink = DiagnosticSink::new(false);
        let mut ast = parse("<div>{{ x }}<!-- note --></div>", &opts, &mut sink);
        optimize(&mut ast, &opts);
        let code = generate(&ast, &opts, &mut sink);
        let out = code.program.to_string();
        assert!(out.contains("comment \" note \""), "got: {out}");
    }
}
