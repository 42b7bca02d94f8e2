//! file: core/src/dispatch/stmt.rs
//! description: statement codegen.

use super::{Lang, NodeBehavior, convert, type_of};
use crate::ast::{AstNode, AstNodeKind};
use crate::ir::lower::{CONSTRUCTOR, LoweringError, TranslationContext, function_name, tables};
use crate::ir::op::{Instr, Terminator};
use crate::ir::value::IrType;
use crate::types::Type;

pub struct BlockBehavior;

impl NodeBehavior for BlockBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        ctx.push_scope();
        let result = lang.translate_children(node, ctx);
        ctx.pop_scope();
        result
    }
}

pub struct IfBehavior;

impl NodeBehavior for IfBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::If { condition, then_branch, else_branch } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "if lowering"));
        };
        let then_block = ctx.append_block("if.then")?;
        let else_block = match else_branch {
            Some(_) => Some(ctx.append_block("if.else")?),
            None => None,
        };
        let end = ctx.append_block("if.end")?;

        lang.translate_conditional(condition, ctx, then_block, else_block.unwrap_or(end))?;

        ctx.position_at_end(then_block)?;
        lang.translate(then_branch, ctx)?;
        ctx.terminate(Terminator::Br { target: end })?;

        if let (Some(block), Some(branch)) = (else_block, else_branch) {
            ctx.position_at_end(block)?;
            lang.translate(branch, ctx)?;
            ctx.terminate(Terminator::Br { target: end })?;
        }
        ctx.position_at_end(end)
    }
}

pub struct WhileBehavior;

impl NodeBehavior for WhileBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::While { condition, body } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "while lowering"));
        };
        let head = ctx.append_block("while.cond")?;
        let body_block = ctx.append_block("while.body")?;
        let end = ctx.append_block("while.end")?;

        ctx.terminate(Terminator::Br { target: head })?;
        ctx.position_at_end(head)?;
        lang.translate_conditional(condition, ctx, body_block, end)?;

        ctx.position_at_end(body_block)?;
        lang.translate(body, ctx)?;
        ctx.terminate(Terminator::Br { target: head })?;
        ctx.position_at_end(end)
    }
}

pub struct ReturnBehavior;

impl NodeBehavior for ReturnBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::Return { value } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "return lowering"));
        };
        let ret = ctx.builder()?.ret();
        let term = match value {
            Some(value) if ret != IrType::Void => Terminator::Ret { value: Some((ret, lang.value_of(value, ctx)?)) },
            Some(value) => {
                lang.translate(value, ctx)?;
                Terminator::Ret { value: None }
            }
            None => Terminator::Ret { value: None },
        };
        ctx.terminate(term)
    }
}

pub struct ExprStmtBehavior;

impl NodeBehavior for ExprStmtBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        match &node.kind {
            AstNodeKind::ExprStmt { expr } => lang.translate(expr, ctx),
            other => Err(LoweringError::unsupported(other.tag(), "expression statement")),
        }
    }
}

/// `super(...)` / `this(...)`: a direct call of the named constructor on
/// the current receiver.
pub struct ConstructorCallBehavior;

impl NodeBehavior for ConstructorCallBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::ConstructorCall { owner, params, args, .. } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "constructor call"));
        };
        let mut call_args = vec![(IrType::Ptr, ctx.this_operand()?)];
        call_args.extend(lower_args(lang, ctx, params, args)?);
        ctx.emit(Instr::Call {
            dest: None,
            ret: IrType::Void,
            callee: function_name(owner, CONSTRUCTOR, params),
            args: call_args,
        })
    }
}

/// Evaluate call arguments left to right, converting each to its declared
/// parameter type.
pub(crate) fn lower_args(
    lang: &Lang,
    ctx: &mut TranslationContext<'_>,
    params: &[Type],
    args: &[AstNode],
) -> Result<Vec<(IrType, crate::ir::value::Operand)>, LoweringError> {
    if params.len() != args.len() {
        return Err(LoweringError::internal(format!(
            "call passes {} arguments to {} parameters",
            args.len(),
            params.len()
        )));
    }
    let mut out = Vec::with_capacity(args.len());
    for (param, arg) in params.iter().zip(args) {
        let value = lang.value_of(arg, ctx)?;
        let value = convert(ctx, value, type_of(arg)?, param)?;
        out.push((tables::ir_type(param), value));
    }
    Ok(out)
}
