//! Render program execution.
//!
//! A `Renderer` walks a validated [`Program`] and produces the virtual tree
//! for one scope. Execution never fails: missing bindings resolve to empty
//! text or skipped attributes, and a dangling static reference renders as
//! an empty node.

use std::ops::Range;

use serde_json::Value;

use super::path::{display_value, is_truthy, lookup, Scope};
use super::program::{Program, RenderOp};
use super::vnode::VNode;

pub struct Renderer<'p> {
    statics: &'p [Program],
}

impl<'p> Renderer<'p> {
    pub fn new(statics: &'p [Program]) -> Self {
        Self { statics }
    }

    /// Execute the program. The first node produced at the top level is the
    /// result; a program that produces nothing renders [`VNode::Empty`].
    pub fn render(&self, program: &Program, scope: &Scope) -> VNode {
        let ops = program.ops();
        let mut out = Vec::new();
        let mut i = 0;
        while i < ops.len() {
            i = self.exec_at(ops, i, scope, &mut out);
        }
        if out.is_empty() {
            VNode::Empty
        } else {
            out.swap_remove(0)
        }
    }

    /// Execute the op at `i`, appending produced nodes, returning the index
    /// of the next op to execute.
    fn exec_at(&self, ops: &[RenderOp], i: usize, scope: &Scope, out: &mut Vec<VNode>) -> usize {
        match &ops[i] {
            RenderOp::Elem { tag, ns } => {
                let end = block_end(ops, i);
                out.push(self.build_element(ops, i + 1..end, scope, tag, ns.clone()));
                end + 1
            }
            RenderOp::Text { text } => {
                out.push(VNode::Text(text.clone()));
                i + 1
            }
            RenderOp::Interp { expr } => {
                let text = lookup(scope, expr).map(display_value).unwrap_or_default();
                out.push(VNode::Text(text));
                i + 1
            }
            RenderOp::Comment { text } => {
                out.push(VNode::Comment(text.clone()));
                i + 1
            }
            RenderOp::Static { index } => {
                match self.statics.get(*index) {
                    // Hoisted trees are fully static and may not reference
                    // further statics, so they run with an empty table.
                    Some(program) => out.push(Renderer::new(&[]).render(program, scope)),
                    None => out.push(VNode::Empty),
                }
                i + 1
            }
            RenderOp::If { .. } => {
                let (arms, end) = scan_arms(ops, i);
                for (cond, arm) in arms {
                    let taken = match cond {
                        Some(expr) => lookup(scope, expr).map(is_truthy).unwrap_or(false),
                        None => true,
                    };
                    if taken {
                        self.exec_range(ops, arm, scope, out);
                        break;
                    }
                }
                end + 1
            }
            RenderOp::For { expr, value, index } => {
                let end = block_end(ops, i);
                self.exec_for(ops, i + 1..end, scope, expr, value, index.as_deref(), out);
                end + 1
            }
            // Structural tokens are consumed by the block scanners; reaching
            // one directly means the range bounds already cover it.
            RenderOp::Attr { .. }
            | RenderOp::BoundAttr { .. }
            | RenderOp::Prop { .. }
            | RenderOp::Elif { .. }
            | RenderOp::Else
            | RenderOp::End => i + 1,
        }
    }

    fn exec_range(&self, ops: &[RenderOp], range: Range<usize>, scope: &Scope, out: &mut Vec<VNode>) {
        let mut i = range.start;
        while i < range.end {
            i = self.exec_at(ops, i, scope, out);
        }
    }

    fn build_element(
        &self,
        ops: &[RenderOp],
        body: Range<usize>,
        scope: &Scope,
        tag: &str,
        ns: Option<String>,
    ) -> VNode {
        let mut attrs = Vec::new();
        let mut props = Vec::new();
        let mut children = Vec::new();
        let mut i = body.start;
        while i < body.end {
            match &ops[i] {
                RenderOp::Attr { name, value } => {
                    push_attr(&mut attrs, name, value.clone());
                    i += 1;
                }
                RenderOp::BoundAttr { name, expr } => {
                    // null and false drop the attribute entirely.
                    if let Some(value) = lookup(scope, expr) {
                        if !matches!(value, Value::Null | Value::Bool(false)) {
                            push_attr(&mut attrs, name, display_value(value));
                        }
                    }
                    i += 1;
                }
                RenderOp::Prop { name, expr } => {
                    if let Some(value) = lookup(scope, expr) {
                        if !value.is_null() {
                            props.push((name.clone(), value.clone()));
                        }
                    }
                    i += 1;
                }
                _ => i = self.exec_at(ops, i, scope, &mut children),
            }
        }
        VNode::Element {
            tag: tag.to_string(),
            ns,
            attrs,
            props,
            children,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn exec_for(
        &self,
        ops: &[RenderOp],
        body: Range<usize>,
        scope: &Scope,
        expr: &str,
        value_name: &str,
        index_name: Option<&str>,
        out: &mut Vec<VNode>,
    ) {
        let iterated = match lookup(scope, expr) {
            Some(v) => v.clone(),
            None => return,
        };
        let mut run = |item: Value, position: Value| {
            let mut child = scope.clone();
            child.insert(value_name.to_string(), item);
            if let Some(name) = index_name {
                child.insert(name.to_string(), position);
            }
            self.exec_range(ops, body.clone(), &child, out);
        };
        match iterated {
            Value::Array(items) => {
                for (idx, item) in items.into_iter().enumerate() {
                    run(item, Value::from(idx));
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    run(item, Value::from(key));
                }
            }
            Value::Number(n) => {
                // Ranges iterate 1..=n, the position still counts from 0.
                if let Some(n) = n.as_u64() {
                    for i in 1..=n {
                        run(Value::from(i), Value::from(i - 1));
                    }
                }
            }
            Value::String(s) => {
                for (idx, c) in s.chars().enumerate() {
                    run(Value::from(c.to_string()), Value::from(idx));
                }
            }
            Value::Null | Value::Bool(_) => {}
        }
    }
}

/// Record an attribute, space-joining onto an existing name. Repeats only
/// arise when a literal and a bound value target the same attribute, as a
/// `class` plus `:class` pair does, and those are meant to combine.
fn push_attr(attrs: &mut Vec<(String, String)>, name: &str, value: String) {
    match attrs.iter_mut().find(|(n, _)| n == name) {
        Some((_, existing)) => {
            if !existing.is_empty() && !value.is_empty() {
                existing.push(' ');
            }
            existing.push_str(&value);
        }
        None => attrs.push((name.to_string(), value)),
    }
}

/// Index of the `End` closing the block opened at `open`.
fn block_end(ops: &[RenderOp], open: usize) -> usize {
    let mut depth = 0usize;
    let mut i = open + 1;
    while i < ops.len() {
        match &ops[i] {
            RenderOp::Elem { .. } | RenderOp::If { .. } | RenderOp::For { .. } => depth += 1,
            RenderOp::End => {
                if depth == 0 {
                    return i;
                }
                depth -= 1;
            }
            _ => {}
        }
        i += 1;
    }
    ops.len()
}

/// Arms of the conditional opened at `open`: `(condition, body-range)`
/// pairs in order, plus the index of the closing `End`.
fn scan_arms(ops: &[RenderOp], open: usize) -> (Vec<(Option<&str>, Range<usize>)>, usize) {
    let mut arms = Vec::new();
    let mut cond: Option<&str> = match &ops[open] {
        RenderOp::If { cond } => Some(cond),
        _ => None,
    };
    let mut arm_start = open + 1;
    let mut depth = 0usize;
    let mut i = open + 1;
    while i < ops.len() {
        match &ops[i] {
            RenderOp::Elem { .. } | RenderOp::If { .. } | RenderOp::For { .. } => depth += 1,
            RenderOp::End => {
                if depth == 0 {
                    arms.push((cond, arm_start..i));
                    return (arms, i);
                }
                depth -= 1;
            }
            RenderOp::Elif { cond: next } if depth == 0 => {
                arms.push((cond, arm_start..i));
                cond = Some(next);
                arm_start = i + 1;
            }
            RenderOp::Else if depth == 0 => {
                arms.push((cond, arm_start..i));
                cond = None;
                arm_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    arms.push((cond, arm_start..ops.len()));
    (arms, ops.len())
}
