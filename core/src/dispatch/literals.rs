use super::{Lang, NodeBehavior};
use crate::ast::{AstNode, AstNodeKind, build};
use crate::ir::lower::{LoweringError, TranslationContext};
use crate::ir::op::Terminator;
use crate::ir::value::{BlockId, IrType, Operand};

/// Numeric, character and null literals.
pub struct ConstantBehavior;

impl NodeBehavior for ConstantBehavior {
    fn translate_value(&self, _lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        let value = match &node.kind {
            AstNodeKind::IntLit { value } => Operand::int(IrType::I32, i64::from(*value)),
            AstNodeKind::LongLit { value } => Operand::int(IrType::I64, *value),
            AstNodeKind::CharLit { value } => Operand::int(IrType::I16, i64::from(*value)),
            AstNodeKind::FloatLit { value } => Operand::ConstFloat { ty: IrType::F32, value: f64::from(*value) },
            AstNodeKind::DoubleLit { value } => Operand::ConstFloat { ty: IrType::F64, value: *value },
            AstNodeKind::NullLit => Operand::Null,
            other => return Err(LoweringError::unsupported(other.tag(), "constant translation")),
        };
        ctx.cache_value(node.id(), value)
    }
}

pub struct BoolLitBehavior;

impl NodeBehavior for BoolLitBehavior {
    fn translate_value(&self, _lang: &Lang, node: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
        match &node.kind {
            AstNodeKind::BoolLit { value } => ctx.cache_value(node.id(), Operand::bool(*value)),
            other => Err(LoweringError::unsupported(other.tag(), "boolean translation")),
        }
    }

    /// A constant condition jumps straight to its target.
    fn translate_conditional(
        &self,
        _lang: &Lang,
        node: &AstNode,
        ctx: &mut TranslationContext<'_>,
        if_true: BlockId,
        if_false: BlockId,
    ) -> Result<(), LoweringError> {
        match &node.kind {
            AstNodeKind::BoolLit { value } => {
                let target = if *value { if_true } else { if_false };
                ctx.terminate(Terminator::Br { target })
            }
            other => Err(LoweringError::unsupported(other.tag(), "conditional translation")),
        }
    }
}

/// String literals never reach codegen: they are rewritten into
/// `new java.lang.String(char[])`.
pub struct StringLitBehavior;

impl NodeBehavior for StringLitBehavior {
    fn remove_string_literals(&self, node: AstNode) -> AstNode {
        match &node.kind {
            AstNodeKind::StringLit { value } => {
                let replacement = build::string_constructor(value);
                match node.location {
                    Some(loc) => replacement.with_location(loc),
                    None => replacement,
                }
            }
            _ => node,
        }
    }
}
