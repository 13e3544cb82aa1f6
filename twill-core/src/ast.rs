//! Annotated template tree.
//!
//! Nodes live in an arena owned by [`Ast`] and refer to each other by
//! [`NodeId`], so parents can point at children and children back at
//! parents without shared ownership. The parser builds the tree, the
//! optimizer writes the static annotations, and code generation reads it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::diag::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One template node. Static annotations sit on the node itself because
/// they apply to every kind, not just elements.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: NodeId,
    /// The containing node. `None` for the root and for conditional-chain
    /// alternates, which are reachable through the chain head instead of a
    /// child list.
    pub parent: Option<NodeId>,
    /// Byte range in the trimmed template covering this node's source.
    pub span: Option<Span>,
    pub is_static: bool,
    pub static_root: bool,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Serialize)]
pub enum NodeKind {
    Element(Element),
    Text(TextNode),
    Interpolation(Interpolation),
    Comment(CommentNode),
}

/// A raw attribute as scanned, before any lifting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attr {
    pub name: String,
    pub value: String,
    pub span: Option<Span>,
}

/// A non-structural directive usage, `t-name:arg="expr"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveUse {
    pub name: String,
    pub arg: Option<String>,
    pub expr: String,
    pub span: Option<Span>,
}

/// One arm of a conditional chain. The chain head carries the whole list;
/// its own arm comes first with a `Some` condition, a final `t-else` arm
/// has `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub condition: Option<String>,
    pub node: NodeId,
}

/// Iteration binding lifted from `t-for`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repeat {
    /// Iterated expression.
    pub expr: String,
    /// Per-item binding name.
    pub value: String,
    /// Optional position binding name.
    pub index: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Element {
    pub tag: String,
    pub ns: Option<String>,
    /// Literal attributes left after lifting, in source order.
    pub attrs: Vec<Attr>,
    /// Bound attributes (`:name="expr"`), in source order.
    pub bound: Vec<Attr>,
    /// Non-structural directives, in source order.
    pub directives: Vec<DirectiveUse>,
    pub children: Vec<NodeId>,
    /// Conditional chain, populated on the chain head only.
    pub branches: Vec<Branch>,
    pub repeat: Option<Repeat>,
    /// Set while parsing when the element carried `t-elif`; consumed when
    /// the element is attached to its chain.
    pub elif_expr: Option<String>,
    /// Set while parsing when the element carried `t-else`.
    pub is_else: bool,
    /// Inside a `t-pre` block: contents compile verbatim.
    pub pre: bool,
    /// Scratch space for transform modules, keyed by module-owned names.
    pub extras: BTreeMap<String, String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// No bindings of any kind; eligible for static marking.
    pub fn is_plain(&self) -> bool {
        self.bound.is_empty()
            && self.directives.is_empty()
            && self.branches.is_empty()
            && self.repeat.is_none()
    }

    pub fn attr(&self, name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|a| a.name == name)
    }

    /// Remove and return a literal attribute, preserving the order of the
    /// rest. Transform modules use this to claim attributes they own.
    pub fn take_attr(&mut self, name: &str) -> Option<Attr> {
        let idx = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(idx))
    }

    /// Remove and return a bound attribute by name.
    pub fn take_bound(&mut self, name: &str) -> Option<Attr> {
        let idx = self.bound.iter().position(|a| a.name == name)?;
        Some(self.bound.remove(idx))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextNode {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpolation {
    /// Trimmed binding expression.
    pub expr: String,
    /// The segment as written, delimiters included. Kept for messages.
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentNode {
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Ast {
    nodes: Vec<Node>,
    pub root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>, span: Option<Span>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            parent,
            span,
            is_static: false,
            static_root: false,
            kind,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id).kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn root_element(&self) -> Option<&Element> {
        self.root.and_then(|id| self.element(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in allocation order. Conditional-chain alternates are
    /// included, so a full walk does not need to chase branches.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }
}
