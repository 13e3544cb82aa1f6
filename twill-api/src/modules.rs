//! Platform transform modules.
//!
//! `class` and `style` get special handling: the literal attribute and a
//! bound counterpart may coexist on one element, and both modules claim
//! their attributes during parsing so generation can emit the pair in a
//! fixed order. The renderer joins same-named attributes with a space,
//! which is why the style module guarantees its literal part ends with a
//! semicolon.

use twill_core::ast::Element;
use twill_core::runtime::{Program, RenderOp};
use twill_core::{DiagnosticSink, TransformModule};

pub struct ClassModule;

impl TransformModule for ClassModule {
    fn name(&self) -> &'static str {
        "class"
    }

    fn transform_element(&self, el: &mut Element, _sink: &mut DiagnosticSink) {
        if let Some(attr) = el.take_attr("class") {
            let collapsed = attr.value.split_whitespace().collect::<Vec<_>>().join(" ");
            if !collapsed.is_empty() {
                el.extras.insert("static_class".to_string(), collapsed);
            }
        }
        if let Some(bound) = el.take_bound("class") {
            el.extras.insert("class_binding".to_string(), bound.value);
        }
    }

    fn gen_data(&self, el: &Element, program: &mut Program) {
        if let Some(value) = el.extras.get("static_class") {
            program.push(RenderOp::Attr {
                name: "class".to_string(),
                value: value.clone(),
            });
        }
        if let Some(expr) = el.extras.get("class_binding") {
            program.push(RenderOp::BoundAttr {
                name: "class".to_string(),
                expr: expr.clone(),
            });
        }
    }

    fn static_extras(&self) -> &'static [&'static str] {
        &["static_class"]
    }
}

pub struct StyleModule;

impl TransformModule for StyleModule {
    fn name(&self) -> &'static str {
        "style"
    }

    fn transform_element(&self, el: &mut Element, _sink: &mut DiagnosticSink) {
        if let Some(attr) = el.take_attr("style") {
            let mut css = attr.value.trim().to_string();
            if !css.is_empty() {
                if !css.ends_with(';') {
                    css.push(';');
                }
                el.extras.insert("static_style".to_string(), css);
            }
        }
        if let Some(bound) = el.take_bound("style") {
            el.extras.insert("style_binding".to_string(), bound.value);
        }
    }

    fn gen_data(&self, el: &Element, program: &mut Program) {
        if let Some(value) = el.extras.get("static_style") {
            program.push(RenderOp::Attr {
                name: "style".to_string(),
                value: value.clone(),
            });
        }
        if let Some(expr) = el.extras.get("style_binding") {
            program.push(RenderOp::BoundAttr {
                name: "style".to_string(),
                expr: expr.clone(),
            });
        }
    }

    fn static_extras(&self) -> &'static [&'static str] {
        &["static_style"]
    }
}
