use serde::{Deserialize, Serialize};

use super::kind::AstNodeKind;
use crate::location::Location;
use crate::types::Type;

/// Process-unique identity of an AST node. Rewrites that build a new node
/// allocate a new id; the translation cache is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    #[serde(skip, default = "AstNode::create_id")]
    id: NodeId,
    pub kind: AstNodeKind,
    /// Resolved type; set by the front end on every expression.
    #[serde(default)]
    pub ty: Option<Type>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl AstNode {
    fn create_id() -> NodeId {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(1);
        NodeId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn new(kind: AstNodeKind, location: Option<Location>) -> Self {
        AstNode { id: Self::create_id(), kind, ty: None, location }
    }

    /// Build an untyped, compiler-generated node.
    pub fn synthetic(kind: AstNodeKind) -> Self {
        AstNode::new(kind, None)
    }

    pub fn typed(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &AstNodeKind {
        &self.kind
    }

    pub fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    /// Replace the kind, keeping type and location but taking a new id.
    pub fn rebuilt(&self, kind: AstNodeKind) -> AstNode {
        AstNode { id: Self::create_id(), kind, ty: self.ty.clone(), location: self.location.clone() }
    }

    /// Deep copy with fresh ids throughout, for subtrees that must appear
    /// twice in the rewritten tree.
    pub fn fresh_copy(&self) -> AstNode {
        let copy = self.clone();
        let result: Result<AstNode, std::convert::Infallible> =
            super::visit::rewrite_post_order(copy, &mut |mut n: AstNode| {
                n.id = Self::create_id();
                Ok(n)
            });
        match result {
            Ok(n) => n,
            Err(never) => match never {},
        }
    }
}

impl std::fmt::Debug for AstNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Delegate to Display so both "{}" and "{:?}" print source form
        write!(f, "{}", self)
    }
}
