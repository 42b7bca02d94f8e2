//! file: core/src/ast/mod.rs
//! description: the typed AST handed over by the front end.
//!
//! Nodes are owned trees. Desugaring replaces subtrees functionally, so a
//! rewritten node gets a new `NodeId` while untouched nodes keep theirs.

pub mod build;
pub mod kind;
pub mod node;
pub mod printer;
pub mod visit;

pub use kind::{
    AstNodeKind, BinaryOperator, ClassKind, CtorCallKind, Flags, NodeTag, Param, UnaryOperator,
};
pub use node::{AstNode, NodeId};
