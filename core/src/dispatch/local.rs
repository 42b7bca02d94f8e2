use super::{Lang, NodeBehavior, convert, type_of};
use crate::ast::{AstNode, AstNodeKind};
use crate::ir::lower::{LoweringError, TranslationContext, tables};
use crate::ir::op::Instr;
use crate::ir::value::Operand;

/// A read of a local variable or parameter: load from its slot.
pub struct LocalBehavior;

impl NodeBehavior for LocalBehavior {
    fn translate_value(&self, _lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::Local { name } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "local load"));
        };
        let slot = ctx
            .lookup_local(name)
            .cloned()
            .ok_or_else(|| LoweringError::internal(format!("local '{}' is not in scope", name)))?;
        let dest = ctx.alloc_reg()?;
        ctx.emit(Instr::Load { dest, ty: slot.ty, ptr: slot.ptr })?;
        ctx.cache_value(node.id(), Operand::Reg(dest))
    }
}

pub struct LocalDeclBehavior;

impl NodeBehavior for LocalDeclBehavior {
    fn translate_value(&self, lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let AstNodeKind::LocalDecl { name, var_ty, init } = &node.kind else {
            return Err(LoweringError::unsupported(node.kind.tag(), "local declaration"));
        };
        // The initializer is evaluated before the name comes into scope.
        let value = match init {
            Some(init) => {
                let v = lang.value_of(init, ctx)?;
                Some(convert(ctx, v, type_of(init)?, var_ty)?)
            }
            None => None,
        };
        let slot = ctx.declare_local(name, tables::ir_type(var_ty))?;
        if let Some(value) = value {
            ctx.emit(Instr::Store { ty: slot.ty, value, ptr: slot.ptr })?;
        }
        Ok(())
    }
}
