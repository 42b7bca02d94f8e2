//! file: core/src/dispatch/binary.rs
//! description: binary operators.
//!
//! String concatenation is rewritten into `concat` calls, numeric operands
//! receive explicit widening casts, and codegen picks the instruction from
//! the lowering tables. `&&` and `||` are lowered as control flow.

use super::{Lang, NodeBehavior, convert, type_of};
use crate::ast::{AstNode, AstNodeKind, BinaryOperator, build};
use crate::ir::lower::tables::{self, BinaryShape};
use crate::ir::lower::{LoweringError, TranslationContext};
use crate::ir::op::{Instr, Terminator};
use crate::ir::value::{BlockId, IrType, Operand};
use crate::types::{OBJECT_CLASS, STRING_CLASS, Type};

pub struct BinaryBehavior;

/// `x` as a `String`: strings pass through, the null literal becomes the
/// string "null", anything else goes through `String.valueOf`.
fn stringify(node: AstNode) -> AstNode {
    let ty = node.ty.clone();
    match ty {
        Some(ty) if ty == Type::string() => node,
        _ if matches!(node.kind, AstNodeKind::NullLit) => build::string_constructor("null"),
        Some(Type::Primitive(p)) => {
            build::static_call(STRING_CLASS, "valueOf", vec![Type::Primitive(p)], vec![node], Type::string())
        }
        _ => build::static_call(STRING_CLASS, "valueOf", vec![Type::class(OBJECT_CLASS)], vec![node], Type::string()),
    }
}

fn is_string(node: &AstNode) -> bool {
    node.ty().is_some_and(|t| *t == Type::string())
}

impl NodeBehavior for BinaryBehavior {
    fn remove_string_literals(&self, node: AstNode) -> AstNode {
        let AstNodeKind::Binary { left, op: BinaryOperator::Add, right } = &node.kind else {
            return node;
        };
        if !is_string(left) && !is_string(right) {
            return node;
        }
        let location = node.location.clone();
        let AstNodeKind::Binary { left, right, .. } = node.kind else {
            return node;
        };
        let (left, right) = (stringify(*left), stringify(*right));
        let concat = build::call(left, STRING_CLASS, "concat", vec![Type::string()], vec![right], Type::string());
        match location {
            Some(loc) => concat.with_location(loc),
            None => concat,
        }
    }

    fn add_primitive_widening_casts(&self, node: AstNode) -> AstNode {
        let AstNodeKind::Binary { left, op, right } = &node.kind else {
            return node;
        };
        let (Some(lt), Some(rt)) = (left.ty(), right.ty()) else {
            return node;
        };
        let (left_cast, right_cast) = tables::widening_casts(*op, lt, rt);
        if left_cast.is_none() && right_cast.is_none() {
            return node;
        }
        let op = *op;
        let wrap = |operand: &AstNode, target: Option<Type>| match target {
            Some(t) => build::cast(t, operand.clone()),
            None => operand.clone(),
        };
        let kind = AstNodeKind::Binary {
            left: Box::new(wrap(left, left_cast)),
            op,
            right: Box::new(wrap(right, right_cast)),
        };
        node.rebuilt(kind)
    }

    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::Binary { left, op, right } = &node.kind else {
            return Err(LoweringError::internal("binary behavior applied to a non-binary node"));
        };
        if op.is_logical() {
            return translate_logical_value(lang, node, ctx);
        }

        let (lt, rt) = (type_of(left)?, type_of(right)?);
        let operand_ty = if op.is_shift() {
            type_of(node)?.clone()
        } else {
            tables::promote(lt, rt).unwrap_or_else(|| lt.clone())
        };
        let shape = tables::select_binary(*op, &operand_ty)?;

        let lhs = lang.value_of(left, ctx)?;
        let lhs = convert(ctx, lhs, lt, &operand_ty)?;
        let rhs = lang.value_of(right, ctx)?;
        let rhs = convert(ctx, rhs, rt, &operand_ty)?;

        let ty = tables::ir_type(&operand_ty);
        let dest = ctx.alloc_reg()?;
        let instr = match shape {
            BinaryShape::IntArith(op) | BinaryShape::FloatArith(op) => Instr::BinOp { dest, op, ty, lhs, rhs },
            BinaryShape::ICmp(pred) => Instr::ICmp { dest, pred, ty, lhs, rhs },
            BinaryShape::FCmp(pred) => Instr::FCmp { dest, pred, ty, lhs, rhs },
        };
        ctx.emit(instr)?;
        ctx.cache_value(node.id(), Operand::Reg(dest))
    }

    fn translate_conditional(
        &self,
        lang: &Lang,
        node: &AstNode,
        ctx: &mut TranslationContext<'_>,
        if_true: BlockId,
        if_false: BlockId,
    ) -> Result<(), LoweringError> {
        match &node.kind {
            AstNodeKind::Binary { left, op: BinaryOperator::CondAnd, right } => {
                let rhs = ctx.append_block("and.rhs")?;
                lang.translate_conditional(left, ctx, rhs, if_false)?;
                ctx.position_at_end(rhs)?;
                lang.translate_conditional(right, ctx, if_true, if_false)
            }
            AstNodeKind::Binary { left, op: BinaryOperator::CondOr, right } => {
                let rhs = ctx.append_block("or.rhs")?;
                lang.translate_conditional(left, ctx, if_true, rhs)?;
                ctx.position_at_end(rhs)?;
                lang.translate_conditional(right, ctx, if_true, if_false)
            }
            _ => {
                let cond = lang.value_of(node, ctx)?;
                ctx.terminate(Terminator::CondBr { cond, if_true, if_false })
            }
        }
    }
}

/// `a && b` / `a || b` used as a value: branch into blocks that store
/// `true` or `false` into a temporary slot, then load it.
fn translate_logical_value(lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
    let slot = ctx.alloc_slot(IrType::I1)?;
    let on_true = ctx.append_block("cond.true")?;
    let on_false = ctx.append_block("cond.false")?;
    let end = ctx.append_block("cond.end")?;

    lang.translate_conditional(node, ctx, on_true, on_false)?;
    for (block, value) in [(on_true, true), (on_false, false)] {
        ctx.position_at_end(block)?;
        ctx.emit(Instr::Store { ty: IrType::I1, value: Operand::bool(value), ptr: slot.clone() })?;
        ctx.terminate(Terminator::Br { target: end })?;
    }

    ctx.position_at_end(end)?;
    let dest = ctx.alloc_reg()?;
    ctx.emit(Instr::Load { dest, ty: IrType::I1, ptr: slot })?;
    ctx.cache_value(node.id(), Operand::Reg(dest))
}
