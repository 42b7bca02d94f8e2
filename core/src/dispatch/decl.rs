//! file: core/src/dispatch/decl.rs
//! description: declarations. Classes scope the current class name,
//! methods and constructors each become one IR function.

use super::{Lang, NodeBehavior};
use crate::ast::{AstNode, AstNodeKind, Param};
use crate::ir::lower::{CONSTRUCTOR, LoweringError, TranslationContext, function_name, tables};
use crate::ir::op::Instr;
use crate::ir::value::{IrType, Operand};

pub struct ClassBehavior;

impl NodeBehavior for ClassBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::ClassDecl { name, members, .. } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "class lowering"));
        };
        let outer = ctx.set_current_class(Some(name.clone()));
        let mut result = Ok(());
        for member in members {
            result = match &member.kind {
                AstNodeKind::FieldDecl { init: None, .. } => Ok(()),
                AstNodeKind::FieldDecl { name: field, init: Some(_), .. } => Err(LoweringError::internal(format!(
                    "initializer of field '{}.{}' was not moved into a constructor",
                    name, field
                ))),
                _ => lang.translate(member, ctx),
            };
            if result.is_err() {
                break;
            }
        }
        ctx.set_current_class(outer);
        result
    }
}

pub struct MethodBehavior;

impl NodeBehavior for MethodBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::MethodDecl { name, flags, params, ret, body } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "method lowering"));
        };
        // Abstract and interface methods have nothing to lower.
        let Some(body) = body else {
            return Ok(());
        };
        let owner = current_class(ctx)?;
        let symbol = function_name(&owner, name, &param_types(params));
        lower_function(lang, ctx, &symbol, !flags.is_static, params, tables::ir_type(ret), body)
    }
}

pub struct ConstructorBehavior;

impl NodeBehavior for ConstructorBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::ConstructorDecl { params, body, .. } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "constructor lowering"));
        };
        let owner = current_class(ctx)?;
        let symbol = function_name(&owner, CONSTRUCTOR, &param_types(params));
        lower_function(lang, ctx, &symbol, true, params, IrType::Void, body)
    }
}

fn current_class(ctx: &TranslationContext<'_>) -> Result<String, LoweringError> {
    ctx.current_class()
        .map(str::to_string)
        .ok_or_else(|| LoweringError::internal("member declared outside of a class"))
}

fn param_types(params: &[Param]) -> Vec<crate::types::Type> {
    params.iter().map(|p| p.ty.clone()).collect()
}

/// Open `symbol`, spill every parameter into a named slot, lower `body`
/// and close the function.
fn lower_function(
    lang: &Lang,
    ctx: &mut TranslationContext<'_>,
    symbol: &str,
    has_this: bool,
    params: &[Param],
    ret: IrType,
    body: &AstNode,
) -> Result<(), LoweringError> {
    let offset = u32::from(has_this);
    let mut ir_params = Vec::with_capacity(params.len() + 1);
    if has_this {
        ir_params.push(IrType::Ptr);
    }
    ir_params.extend(params.iter().map(|p| tables::ir_type(&p.ty)));

    ctx.begin_function(symbol, ir_params, ret, has_this)?;
    for (i, param) in params.iter().enumerate() {
        let slot = ctx.declare_local(&param.name, tables::ir_type(&param.ty))?;
        let arg = Operand::Arg(offset + i as u32);
        ctx.emit(Instr::Store { ty: slot.ty, value: arg, ptr: slot.ptr })?;
    }
    lang.translate(body, ctx)?;
    ctx.end_function()
}
