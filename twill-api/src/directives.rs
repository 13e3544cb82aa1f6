//! Built-in directive generators.
//!
//! Each returns a handler the code generator calls while the owning
//! element's block is open, so pushed ops land inside that block.

use std::sync::Arc;

use twill_core::ast::{DirectiveUse, Element};
use twill_core::runtime::{Program, RenderOp};
use twill_core::{DiagnosticSink, DirectiveHandler};

/// `t-text`: replace the element's content with the escaped value.
pub fn text() -> DirectiveHandler {
    Arc::new(content_directive("text", "textContent"))
}

/// `t-html`: replace the element's content with raw markup.
pub fn html() -> DirectiveHandler {
    Arc::new(content_directive("html", "innerHTML"))
}

fn content_directive(
    name: &'static str,
    prop: &'static str,
) -> impl Fn(&Element, &DirectiveUse, &mut Program, &mut DiagnosticSink) + Send + Sync {
    move |_el, d, program, sink| {
        let expr = d.expr.trim();
        if expr.is_empty() {
            sink.error(format!("t-{name} requires an expression"), d.span);
            return;
        }
        program.push(RenderOp::Prop {
            name: prop.to_string(),
            expr: expr.to_string(),
        });
    }
}

/// Tags `t-model` makes sense on.
const MODEL_TAGS: &[&str] = &["input", "textarea", "select"];

/// `t-model`: bind the control's value. Anything but a form control is
/// rejected with a diagnostic.
pub fn model() -> DirectiveHandler {
    Arc::new(|el: &Element, d: &DirectiveUse, program: &mut Program, sink: &mut DiagnosticSink| {
        if !MODEL_TAGS.contains(&el.tag.as_str()) {
            sink.error(
                format!("t-model is not supported on <{}>", el.tag),
                d.span,
            );
            return;
        }
        let expr = d.expr.trim();
        if expr.is_empty() {
            sink.error("t-model requires an expression".to_string(), d.span);
            return;
        }
        program.push(RenderOp::Prop {
            name: "value".to_string(),
            expr: expr.to_string(),
        });
    })
}
