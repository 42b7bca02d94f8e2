//! file: core/src/dispatch/mod.rs
//! description: per-node-kind behavior objects.
//!
//! Every `NodeTag` maps to a `NodeBehavior` held by `Lang`. A behavior
//! implements only the hooks that matter for its kind; the rest fall back
//! to the trait defaults, which either leave the node alone (rewrites) or
//! recurse into the children (translation). Callers can swap the behavior
//! of any kind with `Lang::override_behavior`.

mod binary;
mod decl;
mod expr;
mod literals;
mod local;
mod stmt;

use std::collections::HashMap;
use std::convert::Infallible;

use crate::ast::visit::{children, rewrite_post_order};
use crate::ast::{AstNode, NodeTag};
use crate::ir::lower::{LoweringError, TranslationContext, tables};
use crate::ir::op::{Instr, Terminator};
use crate::ir::value::{BlockId, Operand};
use crate::types::Type;

pub use binary::BinaryBehavior;
pub use decl::{ClassBehavior, ConstructorBehavior, MethodBehavior};
pub use expr::{
    ArrayInitBehavior, AssignBehavior, CallBehavior, CastBehavior, FieldBehavior, NewBehavior, SpecialBehavior,
    UnaryBehavior,
};
pub use literals::{BoolLitBehavior, ConstantBehavior, StringLitBehavior};
pub use local::{LocalBehavior, LocalDeclBehavior};
pub use stmt::{BlockBehavior, ConstructorCallBehavior, ExprStmtBehavior, IfBehavior, ReturnBehavior, WhileBehavior};

pub trait NodeBehavior {
    /// Replace string literals and string concatenation by explicit
    /// constructions and calls. Children have already been rewritten.
    fn remove_string_literals(&self, node: AstNode) -> AstNode {
        node
    }

    /// Insert explicit widening casts on operands. Children have already
    /// been rewritten.
    fn add_primitive_widening_casts(&self, node: AstNode) -> AstNode {
        node
    }

    /// Emit code for `node`, caching its value in `ctx` when it has one.
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        lang.translate_children(node, ctx)
    }

    /// Emit a branch to `if_true` or `if_false` depending on the boolean
    /// value of `node`. The current block is terminated afterwards.
    fn translate_conditional(
        &self,
        lang: &Lang,
        node: &AstNode,
        ctx: &mut TranslationContext<'_>,
        if_true: BlockId,
        if_false: BlockId,
    ) -> Result<(), LoweringError> {
        let cond = lang.value_of(node, ctx)?;
        ctx.terminate(Terminator::CondBr { cond, if_true, if_false })
    }
}

/// Behavior for kinds with no hooks of their own.
pub struct Generic;

impl NodeBehavior for Generic {}

pub struct Lang {
    behaviors: HashMap<NodeTag, Box<dyn NodeBehavior>>,
}

impl Default for Lang {
    fn default() -> Self {
        Lang::new()
    }
}

impl Lang {
    /// The standard behavior table.
    pub fn new() -> Self {
        let mut lang = Lang { behaviors: HashMap::new() };
        lang.register(NodeTag::ClassDecl, ClassBehavior);
        lang.register(NodeTag::MethodDecl, MethodBehavior);
        lang.register(NodeTag::ConstructorDecl, ConstructorBehavior);
        lang.register(NodeTag::Block, BlockBehavior);
        lang.register(NodeTag::LocalDecl, LocalDeclBehavior);
        lang.register(NodeTag::If, IfBehavior);
        lang.register(NodeTag::While, WhileBehavior);
        lang.register(NodeTag::Return, ReturnBehavior);
        lang.register(NodeTag::ExprStmt, ExprStmtBehavior);
        lang.register(NodeTag::ConstructorCall, ConstructorCallBehavior);
        lang.register(NodeTag::Binary, BinaryBehavior);
        lang.register(NodeTag::Unary, UnaryBehavior);
        lang.register(NodeTag::Cast, CastBehavior);
        lang.register(NodeTag::Assign, AssignBehavior);
        lang.register(NodeTag::Local, LocalBehavior);
        lang.register(NodeTag::Field, FieldBehavior);
        lang.register(NodeTag::Call, CallBehavior);
        lang.register(NodeTag::New, NewBehavior);
        lang.register(NodeTag::Special, SpecialBehavior);
        lang.register(NodeTag::ArrayInit, ArrayInitBehavior);
        lang.register(NodeTag::BoolLit, BoolLitBehavior);
        lang.register(NodeTag::StringLit, StringLitBehavior);
        for tag in [
            NodeTag::IntLit,
            NodeTag::LongLit,
            NodeTag::FloatLit,
            NodeTag::DoubleLit,
            NodeTag::CharLit,
            NodeTag::NullLit,
        ] {
            lang.register(tag, ConstantBehavior);
        }
        lang
    }

    fn register(&mut self, tag: NodeTag, behavior: impl NodeBehavior + 'static) {
        self.behaviors.insert(tag, Box::new(behavior));
    }

    /// Replace the behavior of `tag`, returning the previous one.
    pub fn override_behavior(&mut self, tag: NodeTag, behavior: Box<dyn NodeBehavior>) -> Option<Box<dyn NodeBehavior>> {
        self.behaviors.insert(tag, behavior)
    }

    pub fn behavior(&self, tag: NodeTag) -> &dyn NodeBehavior {
        match self.behaviors.get(&tag) {
            Some(b) => b.as_ref(),
            None => &Generic,
        }
    }

    fn rewrite(&self, node: AstNode, hook: fn(&dyn NodeBehavior, AstNode) -> AstNode) -> AstNode {
        let result: Result<AstNode, Infallible> =
            rewrite_post_order(node, &mut |n: AstNode| Ok(hook(self.behavior(n.kind.tag()), n)));
        match result {
            Ok(n) => n,
            Err(never) => match never {},
        }
    }

    pub fn remove_string_literals(&self, node: AstNode) -> AstNode {
        self.rewrite(node, |b, n| b.remove_string_literals(n))
    }

    pub fn add_primitive_widening_casts(&self, node: AstNode) -> AstNode {
        self.rewrite(node, |b, n| b.add_primitive_widening_casts(n))
    }

    /// The node-local lowering applied as the last desugar stage: string
    /// literal removal over the whole tree, then widening casts.
    pub fn desugar_locally(&self, node: AstNode) -> AstNode {
        let node = self.remove_string_literals(node);
        self.add_primitive_widening_casts(node)
    }

    pub fn translate(&self, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        self.behavior(node.kind.tag())
            .translate_value(self, node, ctx)
            .map_err(|e| e.at(node.location.as_ref()))
    }

    /// The value of `node`, translating it first unless already cached.
    pub fn value_of(&self, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<Operand, LoweringError> {
        if let Some(v) = ctx.value(node.id()) {
            return Ok(v.clone());
        }
        self.translate(node, ctx)?;
        ctx.value(node.id())
            .cloned()
            .ok_or_else(|| LoweringError::unsupported(node.kind.tag(), "value translation").at(node.location.as_ref()))
    }

    pub fn translate_conditional(
        &self,
        node: &AstNode,
        ctx: &mut TranslationContext<'_>,
        if_true: BlockId,
        if_false: BlockId,
    ) -> Result<(), LoweringError> {
        self.behavior(node.kind.tag())
            .translate_conditional(self, node, ctx, if_true, if_false)
            .map_err(|e| e.at(node.location.as_ref()))
    }

    pub fn translate_children(&self, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        for child in children(node) {
            self.translate(child, ctx)?;
        }
        Ok(())
    }
}

/// Resolved type of an expression node.
pub(crate) fn type_of(node: &AstNode) -> Result<&Type, LoweringError> {
    node.ty()
        .ok_or_else(|| LoweringError::internal(format!("untyped {} reached codegen", node.kind.tag())).at(node.location.as_ref()))
}

/// Convert `value` from `from` to `to`, emitting a cast instruction when
/// the IR representations differ. Reference conversions are free.
pub(crate) fn convert(
    ctx: &mut TranslationContext<'_>,
    value: Operand,
    from: &Type,
    to: &Type,
) -> Result<Operand, LoweringError> {
    let (Some(src), Some(dst)) = (from.as_primitive(), to.as_primitive()) else {
        return Ok(value);
    };
    match tables::cast_op(src, dst)? {
        Some(op) => {
            let dest = ctx.alloc_reg()?;
            ctx.emit(Instr::Cast { dest, op, from: tables::ir_type(from), value, to: tables::ir_type(to) })?;
            Ok(Operand::Reg(dest))
        }
        None => Ok(value),
    }
}
