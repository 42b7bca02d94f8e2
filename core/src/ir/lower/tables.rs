//! file: core/src/ir/lower/tables.rs
//! description: type-directed lowering tables.
//!
//! Pure functions from (operator, operand type) to instruction shape and
//! from operand pairs to their promoted type. Nothing here touches the
//! translation context.

use super::err::LoweringError;
use crate::ast::BinaryOperator;
use crate::ir::op::{BinOpcode, CastOp, IntPredicate, RealPredicate};
use crate::ir::value::IrType;
use crate::types::{PrimitiveType, Type};

/// Binary numeric promotion. `None` unless both operands are numeric
/// primitives.
pub fn promote(left: &Type, right: &Type) -> Option<Type> {
    let (l, r) = (left.as_primitive()?, right.as_primitive()?);
    if !l.is_numeric() || !r.is_numeric() {
        return None;
    }
    let either = |p: PrimitiveType| l == p || r == p;
    let promoted = if either(PrimitiveType::Double) {
        PrimitiveType::Double
    } else if either(PrimitiveType::Float) {
        PrimitiveType::Float
    } else if either(PrimitiveType::Long) {
        PrimitiveType::Long
    } else {
        PrimitiveType::Int
    };
    Some(Type::Primitive(promoted))
}

/// Unary numeric promotion: sub-int integral types become `int`.
pub fn promote_unary(ty: PrimitiveType) -> PrimitiveType {
    match ty {
        PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char => PrimitiveType::Int,
        other => other,
    }
}

/// Casts to insert on the (left, right) operands of `op`. Shifts and the
/// conditional operators never widen.
pub fn widening_casts(op: BinaryOperator, left: &Type, right: &Type) -> (Option<Type>, Option<Type>) {
    if op.is_shift() || op.is_logical() {
        return (None, None);
    }
    match promote(left, right) {
        Some(target) => {
            let cast_for = |t: &Type| if *t != target { Some(target.clone()) } else { None };
            (cast_for(left), cast_for(right))
        }
        None => (None, None),
    }
}

pub fn ir_type(ty: &Type) -> IrType {
    match ty {
        Type::Primitive(p) => match p {
            PrimitiveType::Boolean => IrType::I1,
            PrimitiveType::Byte => IrType::I8,
            PrimitiveType::Short | PrimitiveType::Char => IrType::I16,
            PrimitiveType::Int => IrType::I32,
            PrimitiveType::Long => IrType::I64,
            PrimitiveType::Float => IrType::F32,
            PrimitiveType::Double => IrType::F64,
        },
        Type::Class(_) | Type::Array(_) | Type::Null => IrType::Ptr,
        Type::Void => IrType::Void,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryShape {
    IntArith(BinOpcode),
    FloatArith(BinOpcode),
    ICmp(IntPredicate),
    FCmp(RealPredicate),
}

/// Integer arithmetic and bitwise opcodes. Division, remainder and `>>`
/// use the unsigned forms for `char`; `>>>` is always logical.
pub fn int_binop(op: BinaryOperator, ty: PrimitiveType) -> Option<BinOpcode> {
    let unsigned = ty.is_unsigned();
    let opcode = match op {
        BinaryOperator::Add => BinOpcode::Add,
        BinaryOperator::Sub => BinOpcode::Sub,
        BinaryOperator::Mul => BinOpcode::Mul,
        BinaryOperator::Div if unsigned => BinOpcode::UDiv,
        BinaryOperator::Div => BinOpcode::SDiv,
        BinaryOperator::Mod if unsigned => BinOpcode::URem,
        BinaryOperator::Mod => BinOpcode::SRem,
        BinaryOperator::BitAnd => BinOpcode::And,
        BinaryOperator::BitOr => BinOpcode::Or,
        BinaryOperator::BitXor => BinOpcode::Xor,
        BinaryOperator::Shl => BinOpcode::Shl,
        BinaryOperator::Shr if unsigned => BinOpcode::LShr,
        BinaryOperator::Shr => BinOpcode::AShr,
        BinaryOperator::Ushr => BinOpcode::LShr,
        _ => return None,
    };
    Some(opcode)
}

pub fn float_binop(op: BinaryOperator) -> Option<BinOpcode> {
    let opcode = match op {
        BinaryOperator::Add => BinOpcode::FAdd,
        BinaryOperator::Sub => BinOpcode::FSub,
        BinaryOperator::Mul => BinOpcode::FMul,
        BinaryOperator::Div => BinOpcode::FDiv,
        BinaryOperator::Mod => BinOpcode::FRem,
        _ => return None,
    };
    Some(opcode)
}

pub fn icmp_predicate(op: BinaryOperator, unsigned: bool) -> Option<IntPredicate> {
    let pred = match (op, unsigned) {
        (BinaryOperator::Eq, _) => IntPredicate::Eq,
        (BinaryOperator::Ne, _) => IntPredicate::Ne,
        (BinaryOperator::Lt, false) => IntPredicate::Slt,
        (BinaryOperator::Le, false) => IntPredicate::Sle,
        (BinaryOperator::Gt, false) => IntPredicate::Sgt,
        (BinaryOperator::Ge, false) => IntPredicate::Sge,
        (BinaryOperator::Lt, true) => IntPredicate::Ult,
        (BinaryOperator::Le, true) => IntPredicate::Ule,
        (BinaryOperator::Gt, true) => IntPredicate::Ugt,
        (BinaryOperator::Ge, true) => IntPredicate::Uge,
        _ => return None,
    };
    Some(pred)
}

pub fn fcmp_predicate(op: BinaryOperator) -> Option<RealPredicate> {
    let pred = match op {
        BinaryOperator::Eq => RealPredicate::Oeq,
        BinaryOperator::Ne => RealPredicate::One,
        BinaryOperator::Lt => RealPredicate::Olt,
        BinaryOperator::Le => RealPredicate::Ole,
        BinaryOperator::Gt => RealPredicate::Ogt,
        BinaryOperator::Ge => RealPredicate::Oge,
        _ => return None,
    };
    Some(pred)
}

/// Instruction shape for `op` applied to operands of type `operand`. The
/// operands are expected to already share a type (shifts excepted).
pub fn select_binary(op: BinaryOperator, operand: &Type) -> Result<BinaryShape, LoweringError> {
    let shape = match operand {
        Type::Primitive(PrimitiveType::Boolean) => match op {
            BinaryOperator::BitAnd => Some(BinaryShape::IntArith(BinOpcode::And)),
            BinaryOperator::BitOr => Some(BinaryShape::IntArith(BinOpcode::Or)),
            BinaryOperator::BitXor => Some(BinaryShape::IntArith(BinOpcode::Xor)),
            BinaryOperator::Eq => Some(BinaryShape::ICmp(IntPredicate::Eq)),
            BinaryOperator::Ne => Some(BinaryShape::ICmp(IntPredicate::Ne)),
            _ => None,
        },
        Type::Primitive(p) if p.is_integral() => {
            if op.is_comparison() {
                icmp_predicate(op, p.is_unsigned()).map(BinaryShape::ICmp)
            } else {
                int_binop(op, *p).map(BinaryShape::IntArith)
            }
        }
        Type::Primitive(_) => {
            if op.is_comparison() {
                fcmp_predicate(op).map(BinaryShape::FCmp)
            } else {
                float_binop(op).map(BinaryShape::FloatArith)
            }
        }
        Type::Class(_) | Type::Array(_) | Type::Null => match op {
            BinaryOperator::Eq => Some(BinaryShape::ICmp(IntPredicate::Eq)),
            BinaryOperator::Ne => Some(BinaryShape::ICmp(IntPredicate::Ne)),
            _ => None,
        },
        Type::Void => None,
    };
    shape.ok_or_else(|| LoweringError::unreachable(op.symbol(), operand))
}

/// Conversion between two primitive types; `None` when the IR types
/// already agree. `boolean` converts to nothing else.
pub fn cast_op(from: PrimitiveType, to: PrimitiveType) -> Result<Option<CastOp>, LoweringError> {
    if from == to {
        return Ok(None);
    }
    if from == PrimitiveType::Boolean || to == PrimitiveType::Boolean {
        return Err(LoweringError::unreachable(format!("cast to {}", to.name()), from.name()));
    }
    let op = match (from.is_floating(), to.is_floating()) {
        (true, true) => {
            if to.bit_width() > from.bit_width() {
                CastOp::FpExt
            } else {
                CastOp::FpTrunc
            }
        }
        (true, false) => {
            if to.is_unsigned() {
                CastOp::FpToUi
            } else {
                CastOp::FpToSi
            }
        }
        (false, true) => {
            if from.is_unsigned() {
                CastOp::UiToFp
            } else {
                CastOp::SiToFp
            }
        }
        (false, false) => {
            if to.bit_width() == from.bit_width() {
                // short <-> char share i16
                return Ok(None);
            } else if to.bit_width() < from.bit_width() {
                CastOp::Trunc
            } else if from.is_unsigned() {
                CastOp::ZExt
            } else {
                CastOp::SExt
            }
        }
    };
    Ok(Some(op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use PrimitiveType::*;

    fn p(t: PrimitiveType) -> Type {
        Type::Primitive(t)
    }

    #[test]
    fn promotion_picks_widest_and_floors_at_int() {
        assert_eq!(promote(&p(Int), &p(Double)), Some(p(Double)));
        assert_eq!(promote(&p(Long), &p(Float)), Some(p(Float)));
        assert_eq!(promote(&p(Int), &p(Long)), Some(p(Long)));
        assert_eq!(promote(&p(Byte), &p(Char)), Some(p(Int)));
        assert_eq!(promote(&p(Short), &p(Short)), Some(p(Int)));
        for same in [Int, Long, Float, Double] {
            assert_eq!(promote(&p(same), &p(same)), Some(p(same)));
        }
    }

    #[test]
    fn promotion_ignores_booleans_and_references() {
        assert_eq!(promote(&p(Boolean), &p(Int)), None);
        assert_eq!(promote(&Type::string(), &p(Int)), None);
    }

    #[test]
    fn shifts_never_widen() {
        assert_eq!(widening_casts(BinaryOperator::Shl, &p(Long), &p(Int)), (None, None));
        assert_eq!(widening_casts(BinaryOperator::Add, &p(Long), &p(Int)), (None, Some(p(Long))));
        assert_eq!(widening_casts(BinaryOperator::Add, &p(Byte), &p(Byte)), (Some(p(Int)), Some(p(Int))));
    }

    #[test]
    fn char_selects_unsigned_forms() {
        assert_eq!(select_binary(BinaryOperator::Div, &p(Char)).unwrap(), BinaryShape::IntArith(BinOpcode::UDiv));
        assert_eq!(select_binary(BinaryOperator::Shr, &p(Char)).unwrap(), BinaryShape::IntArith(BinOpcode::LShr));
        assert_eq!(select_binary(BinaryOperator::Lt, &p(Char)).unwrap(), BinaryShape::ICmp(IntPredicate::Ult));
        assert_eq!(select_binary(BinaryOperator::Lt, &p(Int)).unwrap(), BinaryShape::ICmp(IntPredicate::Slt));
        assert_eq!(select_binary(BinaryOperator::Ushr, &p(Int)).unwrap(), BinaryShape::IntArith(BinOpcode::LShr));
    }

    #[test]
    fn floats_use_ordered_predicates() {
        assert_eq!(select_binary(BinaryOperator::Ne, &p(Double)).unwrap(), BinaryShape::FCmp(RealPredicate::One));
        assert_eq!(select_binary(BinaryOperator::Mod, &p(Float)).unwrap(), BinaryShape::FloatArith(BinOpcode::FRem));
    }

    #[test]
    fn unsupported_combinations_are_errors() {
        assert!(select_binary(BinaryOperator::Shl, &p(Double)).is_err());
        assert!(select_binary(BinaryOperator::Lt, &p(Boolean)).is_err());
        assert!(select_binary(BinaryOperator::Add, &Type::string()).is_err());
        assert!(select_binary(BinaryOperator::CondAnd, &p(Int)).is_err());
    }

    #[test]
    fn casts_follow_source_signedness() {
        assert_eq!(cast_op(Int, Long).unwrap(), Some(CastOp::SExt));
        assert_eq!(cast_op(Char, Int).unwrap(), Some(CastOp::ZExt));
        assert_eq!(cast_op(Long, Byte).unwrap(), Some(CastOp::Trunc));
        assert_eq!(cast_op(Char, Float).unwrap(), Some(CastOp::UiToFp));
        assert_eq!(cast_op(Double, Float).unwrap(), Some(CastOp::FpTrunc));
        assert_eq!(cast_op(Short, Char).unwrap(), None);
        assert!(cast_op(Boolean, Int).is_err());
    }
}
