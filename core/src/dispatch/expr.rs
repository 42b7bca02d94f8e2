//! file: core/src/dispatch/expr.rs
//! description: expression codegen other than binary operators, locals
//! and literals.

use super::stmt::lower_args;
use super::{Lang, NodeBehavior, convert, type_of};
use crate::ast::{AstNode, AstNodeKind, UnaryOperator};
use crate::ir::lower::{CONSTRUCTOR, LoweringError, TranslationContext, function_name, global_name, tables};
use crate::ir::op::{BinOpcode, Instr, Terminator};
use crate::ir::value::{BlockId, IrType, Operand};
use crate::types::Type;

pub struct UnaryBehavior;

impl NodeBehavior for UnaryBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::Unary { op, expr } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "unary lowering"));
        };
        let from = type_of(expr)?;
        let operand_ty = match from.as_primitive() {
            Some(p) if p.is_numeric() => Type::Primitive(tables::promote_unary(p)),
            _ => from.clone(),
        };
        let value = lang.value_of(expr, ctx)?;
        let value = convert(ctx, value, from, &operand_ty)?;
        let ty = tables::ir_type(&operand_ty);

        let (opcode, lhs, rhs) = match (op, ty) {
            (UnaryOperator::Plus, _) => return ctx.cache_value(node.id(), value),
            (UnaryOperator::Neg, IrType::F32 | IrType::F64) => {
                (BinOpcode::FSub, Operand::ConstFloat { ty, value: -0.0 }, value)
            }
            (UnaryOperator::Neg, t) if t.is_int() && t != IrType::I1 => (BinOpcode::Sub, Operand::int(ty, 0), value),
            (UnaryOperator::BitNot, t) if t.is_int() && t != IrType::I1 => (BinOpcode::Xor, value, Operand::int(ty, -1)),
            (UnaryOperator::Not, IrType::I1) => (BinOpcode::Xor, value, Operand::bool(true)),
            _ => return Err(LoweringError::unreachable(format!("{:?}", op), &operand_ty)),
        };
        let dest = ctx.alloc_reg()?;
        ctx.emit(Instr::BinOp { dest, op: opcode, ty, lhs, rhs })?;
        ctx.cache_value(node.id(), Operand::Reg(dest))
    }

    /// `!c` branches on `c` with the targets swapped.
    fn translate_conditional(
        &self,
        lang: &Lang,
        node: &AstNode,
        ctx: &mut TranslationContext<'_>,
        if_true: BlockId,
        if_false: BlockId,
    ) -> Result<(), LoweringError> {
        match &node.kind {
            AstNodeKind::Unary { op: UnaryOperator::Not, expr } => lang.translate_conditional(expr, ctx, if_false, if_true),
            _ => {
                let cond = lang.value_of(node, ctx)?;
                ctx.terminate(Terminator::CondBr { cond, if_true, if_false })
            }
        }
    }
}

pub struct CastBehavior;

impl NodeBehavior for CastBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::Cast { target, expr } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "cast lowering"));
        };
        let value = lang.value_of(expr, ctx)?;
        let value = convert(ctx, value, type_of(expr)?, target)?;
        ctx.cache_value(node.id(), value)
    }
}

pub struct AssignBehavior;

impl NodeBehavior for AssignBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::Assign { target, value } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "assignment"));
        };
        let target_ty = type_of(target)?;
        let ty = tables::ir_type(target_ty);

        // Receiver first, then the right-hand side.
        let receiver = match &target.kind {
            AstNodeKind::Field { target: Some(obj), .. } => Some(lang.value_of(obj, ctx)?),
            _ => None,
        };
        let v = lang.value_of(value, ctx)?;
        let v = convert(ctx, v, type_of(value)?, target_ty)?;

        match &target.kind {
            AstNodeKind::Local { name } => {
                let slot = ctx
                    .lookup_local(name)
                    .cloned()
                    .ok_or_else(|| LoweringError::internal(format!("local '{}' is not in scope", name)))?;
                ctx.emit(Instr::Store { ty: slot.ty, value: v.clone(), ptr: slot.ptr })?;
            }
            AstNodeKind::Field { target: None, owner, name } => {
                ctx.emit(Instr::Store { ty, value: v.clone(), ptr: Operand::Global(global_name(owner, name)) })?;
            }
            AstNodeKind::Field { target: Some(_), owner, name } => {
                let object = receiver.ok_or_else(|| LoweringError::internal("field store without a receiver"))?;
                ctx.emit(Instr::SetField {
                    ty,
                    object,
                    class: owner.clone(),
                    field: name.clone(),
                    value: v.clone(),
                })?;
            }
            other => return Err(LoweringError::unsupported(other.tag(), "assignment target")),
        }
        ctx.cache_value(node.id(), v)
    }
}

pub struct FieldBehavior;

impl NodeBehavior for FieldBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::Field { target, owner, name } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "field load"));
        };
        let ty = tables::ir_type(type_of(node)?);
        let dest = ctx.alloc_reg()?;
        let instr = match target {
            Some(obj) => {
                let object = lang.value_of(obj, ctx)?;
                Instr::GetField { dest, ty, object, class: owner.clone(), field: name.clone() }
            }
            None => Instr::Load { dest, ty, ptr: Operand::Global(global_name(owner, name)) },
        };
        ctx.emit(instr)?;
        ctx.cache_value(node.id(), Operand::Reg(dest))
    }
}

/// Method calls bind statically to `owner.name(params)`.
pub struct CallBehavior;

impl NodeBehavior for CallBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::Call { target, owner, name, params, args } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "call"));
        };
        let mut call_args = Vec::with_capacity(args.len() + 1);
        if let Some(receiver) = target {
            call_args.push((IrType::Ptr, lang.value_of(receiver, ctx)?));
        }
        call_args.extend(lower_args(lang, ctx, params, args)?);

        let ret = node.ty().map(tables::ir_type).unwrap_or(IrType::Void);
        let dest = if ret == IrType::Void { None } else { Some(ctx.alloc_reg()?) };
        ctx.emit(Instr::Call { dest, ret, callee: function_name(owner, name, params), args: call_args })?;
        match dest {
            Some(dest) => ctx.cache_value(node.id(), Operand::Reg(dest)),
            None => Ok(()),
        }
    }
}

pub struct NewBehavior;

impl NodeBehavior for NewBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::New { class, ctor_params, args, body } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "object creation"));
        };
        if body.is_some() {
            return Err(LoweringError::unsupported(node.kind.tag(), "anonymous class bodies"));
        }
        let dest = ctx.alloc_reg()?;
        ctx.emit(Instr::AllocObject { dest, class: class.clone() })?;
        let mut call_args = vec![(IrType::Ptr, Operand::Reg(dest))];
        call_args.extend(lower_args(lang, ctx, ctor_params, args)?);
        ctx.emit(Instr::Call {
            dest: None,
            ret: IrType::Void,
            callee: function_name(class, CONSTRUCTOR, ctor_params),
            args: call_args,
        })?;
        ctx.cache_value(node.id(), Operand::Reg(dest))
    }
}

/// `this`. Qualified forms naming an outer class are gone after desugaring.
pub struct SpecialBehavior;

impl NodeBehavior for SpecialBehavior {
    fn translate_value(&self, _lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::Special { qualifier } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "'this'"));
        };
        if let Some(q) = qualifier {
            if ctx.current_class() != Some(q.as_str()) {
                return Err(LoweringError::unsupported(node.kind.tag(), "qualified 'this' of an enclosing class"));
            }
        }
        let this = ctx.this_operand()?;
        ctx.cache_value(node.id(), this)
    }
}

pub struct ArrayInitBehavior;

impl NodeBehavior for ArrayInitBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::ArrayInit { elem_ty, elements } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "array literal"));
        };
        let mut values = Vec::with_capacity(elements.len());
        for e in elements {
            let v = lang.value_of(e, ctx)?;
            values.push(convert(ctx, v, type_of(e)?, elem_ty)?);
        }
        let dest = ctx.alloc_reg()?;
        ctx.emit(Instr::ArrayLiteral { dest, elem: tables::ir_type(elem_ty), elements: values })?;
        ctx.cache_value(node.id(), Operand::Reg(dest))
    }
}
