//! Static subtree marking.
//!
//! A post-parse pass over the tree that flags nodes whose output can never
//! change (`is_static`) and then elects hoisting candidates among them
//! (`static_root`). Code generation emits each static root once into a
//! side table and replaces it with a reference, so re-renders skip the
//! entire subtree.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::ast::{Ast, NodeId, NodeKind};
use crate::options::FinalOptions;

/// Annotate `ast` in place. Safe to skip entirely; generation treats an
/// unmarked tree as fully dynamic.
#[instrument(target = "twill::optimize", skip_all, fields(nodes = ast.len()))]
pub fn optimize(ast: &mut Ast, opts: &FinalOptions) {
    let root = match ast.root {
        Some(root) => root,
        None => return,
    };
    let static_keys: HashSet<&'static str> = opts
        .modules
        .iter()
        .flat_map(|m| m.static_extras().iter().copied())
        .collect();
    mark_static(ast, opts, &static_keys, root);
    mark_static_roots(ast, root);
    let roots = ast.ids().filter(|&id| ast.node(id).static_root).count();
    debug!(target: "twill::optimize", static_roots = roots, "optimize finished");
}

/// Post-order walk computing `is_static`. Children are resolved first so
/// an element's flag can fold theirs in. Alternates of a conditional chain
/// are marked too, though the chain head itself is never static.
fn mark_static(
    ast: &mut Ast,
    opts: &FinalOptions,
    static_keys: &HashSet<&'static str>,
    id: NodeId,
) -> bool {
    let (children, alternates, pre) = match &ast.node(id).kind {
        NodeKind::Element(el) => (
            el.children.clone(),
            alternate_ids(ast, id),
            el.pre,
        ),
        NodeKind::Text(_) | NodeKind::Comment(_) => {
            ast.node_mut(id).is_static = true;
            return true;
        }
        NodeKind::Interpolation(_) => {
            ast.node_mut(id).is_static = false;
            return false;
        }
    };

    if pre {
        mark_subtree_static(ast, id);
        return true;
    }

    let mut children_static = true;
    for child in children {
        if !mark_static(ast, opts, static_keys, child) {
            children_static = false;
        }
    }
    for alt in alternates {
        mark_static(ast, opts, static_keys, alt);
    }

    let is_static = children_static
        && match &ast.node(id).kind {
            NodeKind::Element(el) => {
                el.is_plain()
                    && (opts.is_reserved_tag)(&el.tag)
                    && el.extras.keys().all(|k| static_keys.contains(k.as_str()))
            }
            _ => false,
        };
    ast.node_mut(id).is_static = is_static;
    is_static
}

/// Everything under a `t-pre` carrier renders literally.
fn mark_subtree_static(ast: &mut Ast, id: NodeId) {
    ast.node_mut(id).is_static = true;
    let children = match ast.element(id) {
        Some(el) => el.children.clone(),
        None => return,
    };
    for child in children {
        mark_subtree_static(ast, child);
    }
}

/// Top-down election of hoisting roots. The first static element on a path
/// wins and the walk stops there; nested static nodes ride along with the
/// hoisted subtree. A single text child is not worth a side-table entry.
fn mark_static_roots(ast: &mut Ast, id: NodeId) {
    let (children, alternates) = match &ast.node(id).kind {
        NodeKind::Element(el) => (el.children.clone(), alternate_ids(ast, id)),
        _ => return,
    };

    if ast.node(id).is_static {
        let only_text_child = children.len() == 1
            && matches!(ast.node(children[0]).kind, NodeKind::Text(_));
        if !children.is_empty() && !only_text_child {
            ast.node_mut(id).static_root = true;
            return;
        }
    }

    for child in children {
        mark_static_roots(ast, child);
    }
    for alt in alternates {
        mark_static_roots(ast, alt);
    }
}

/// Branch nodes other than the chain head itself.
fn alternate_ids(ast: &Ast, id: NodeId) -> Vec<NodeId> {
    match &ast.node(id).kind {
        NodeKind::Element(el) => el
            .branches
            .iter()
            .map(|b| b.node)
            .filter(|&n| n != id)
            .collect(),
        _ => Vec::new(),
    }
}
