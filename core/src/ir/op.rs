//! Instruction set of the IR. Opcode and predicate names follow LLVM so the
//! textual form can be read by anyone familiar with it.

use std::fmt;

use super::value::{BlockId, IrType, Operand, Reg};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOpcode {
    Add,
    Sub,
    Mul,
    SDiv,
    UDiv,
    SRem,
    URem,
    Shl,
    LShr,
    AShr,
    And,
    Or,
    Xor,
    FAdd,
    FSub,
    FMul,
    FDiv,
    FRem,
}

impl BinOpcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinOpcode::Add => "add",
            BinOpcode::Sub => "sub",
            BinOpcode::Mul => "mul",
            BinOpcode::SDiv => "sdiv",
            BinOpcode::UDiv => "udiv",
            BinOpcode::SRem => "srem",
            BinOpcode::URem => "urem",
            BinOpcode::Shl => "shl",
            BinOpcode::LShr => "lshr",
            BinOpcode::AShr => "ashr",
            BinOpcode::And => "and",
            BinOpcode::Or => "or",
            BinOpcode::Xor => "xor",
            BinOpcode::FAdd => "fadd",
            BinOpcode::FSub => "fsub",
            BinOpcode::FMul => "fmul",
            BinOpcode::FDiv => "fdiv",
            BinOpcode::FRem => "frem",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

impl IntPredicate {
    pub fn mnemonic(self) -> &'static str {
        match self {
            IntPredicate::Eq => "eq",
            IntPredicate::Ne => "ne",
            IntPredicate::Slt => "slt",
            IntPredicate::Sle => "sle",
            IntPredicate::Sgt => "sgt",
            IntPredicate::Sge => "sge",
            IntPredicate::Ult => "ult",
            IntPredicate::Ule => "ule",
            IntPredicate::Ugt => "ugt",
            IntPredicate::Uge => "uge",
        }
    }
}

/// Floating comparisons; only the ordered forms are ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RealPredicate {
    Oeq,
    One,
    Olt,
    Ole,
    Ogt,
    Oge,
}

impl RealPredicate {
    pub fn mnemonic(self) -> &'static str {
        match self {
            RealPredicate::Oeq => "oeq",
            RealPredicate::One => "one",
            RealPredicate::Olt => "olt",
            RealPredicate::Ole => "ole",
            RealPredicate::Ogt => "ogt",
            RealPredicate::Oge => "oge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastOp {
    Trunc,
    ZExt,
    SExt,
    FpTrunc,
    FpExt,
    FpToSi,
    FpToUi,
    SiToFp,
    UiToFp,
    /// Reference-to-reference; no bits change.
    Bitcast,
}

impl CastOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            CastOp::Trunc => "trunc",
            CastOp::ZExt => "zext",
            CastOp::SExt => "sext",
            CastOp::FpTrunc => "fptrunc",
            CastOp::FpExt => "fpext",
            CastOp::FpToSi => "fptosi",
            CastOp::FpToUi => "fptoui",
            CastOp::SiToFp => "sitofp",
            CastOp::UiToFp => "uitofp",
            CastOp::Bitcast => "bitcast",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    Alloca { dest: Reg, ty: IrType },
    Load { dest: Reg, ty: IrType, ptr: Operand },
    Store { ty: IrType, value: Operand, ptr: Operand },
    BinOp { dest: Reg, op: BinOpcode, ty: IrType, lhs: Operand, rhs: Operand },
    ICmp { dest: Reg, pred: IntPredicate, ty: IrType, lhs: Operand, rhs: Operand },
    FCmp { dest: Reg, pred: RealPredicate, ty: IrType, lhs: Operand, rhs: Operand },
    Cast { dest: Reg, op: CastOp, from: IrType, value: Operand, to: IrType },
    Call { dest: Option<Reg>, ret: IrType, callee: String, args: Vec<(IrType, Operand)> },
    AllocObject { dest: Reg, class: String },
    GetField { dest: Reg, ty: IrType, object: Operand, class: String, field: String },
    SetField { ty: IrType, object: Operand, class: String, field: String, value: Operand },
    ArrayLiteral { dest: Reg, elem: IrType, elements: Vec<Operand> },
}

impl Instr {
    pub fn dest(&self) -> Option<Reg> {
        match self {
            Instr::Alloca { dest, .. }
            | Instr::Load { dest, .. }
            | Instr::BinOp { dest, .. }
            | Instr::ICmp { dest, .. }
            | Instr::FCmp { dest, .. }
            | Instr::Cast { dest, .. }
            | Instr::AllocObject { dest, .. }
            | Instr::GetField { dest, .. }
            | Instr::ArrayLiteral { dest, .. } => Some(*dest),
            Instr::Call { dest, .. } => *dest,
            Instr::Store { .. } | Instr::SetField { .. } => None,
        }
    }

    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            Instr::Alloca { .. } | Instr::AllocObject { .. } => Vec::new(),
            Instr::Load { ptr, .. } => vec![ptr],
            Instr::Store { value, ptr, .. } => vec![value, ptr],
            Instr::BinOp { lhs, rhs, .. } | Instr::ICmp { lhs, rhs, .. } | Instr::FCmp { lhs, rhs, .. } => {
                vec![lhs, rhs]
            }
            Instr::Cast { value, .. } => vec![value],
            Instr::Call { args, .. } => args.iter().map(|(_, a)| a).collect(),
            Instr::GetField { object, .. } => vec![object],
            Instr::SetField { object, value, .. } => vec![object, value],
            Instr::ArrayLiteral { elements, .. } => elements.iter().collect(),
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Alloca { dest, ty } => write!(f, "{} = alloca {}", dest, ty),
            Instr::Load { dest, ty, ptr } => write!(f, "{} = load {}, ptr {}", dest, ty, ptr),
            Instr::Store { ty, value, ptr } => write!(f, "store {} {}, ptr {}", ty, value, ptr),
            Instr::BinOp { dest, op, ty, lhs, rhs } => {
                write!(f, "{} = {} {} {}, {}", dest, op.mnemonic(), ty, lhs, rhs)
            }
            Instr::ICmp { dest, pred, ty, lhs, rhs } => {
                write!(f, "{} = icmp {} {} {}, {}", dest, pred.mnemonic(), ty, lhs, rhs)
            }
            Instr::FCmp { dest, pred, ty, lhs, rhs } => {
                write!(f, "{} = fcmp {} {} {}, {}", dest, pred.mnemonic(), ty, lhs, rhs)
            }
            Instr::Cast { dest, op, from, value, to } => {
                write!(f, "{} = {} {} {} to {}", dest, op.mnemonic(), from, value, to)
            }
            Instr::Call { dest, ret, callee, args } => {
                let args = args.iter().map(|(t, a)| format!("{} {}", t, a)).collect::<Vec<_>>().join(", ");
                match dest {
                    Some(d) => write!(f, "{} = call {} @\"{}\"({})", d, ret, callee, args),
                    None => write!(f, "call {} @\"{}\"({})", ret, callee, args),
                }
            }
            Instr::AllocObject { dest, class } => write!(f, "{} = new %\"{}\"", dest, class),
            Instr::GetField { dest, ty, object, class, field } => {
                write!(f, "{} = getfield {} %\"{}\".{}, ptr {}", dest, ty, class, field, object)
            }
            Instr::SetField { ty, object, class, field, value } => {
                write!(f, "setfield {} {}, %\"{}\".{}, ptr {}", ty, value, class, field, object)
            }
            Instr::ArrayLiteral { dest, elem, elements } => {
                let elems = elements.iter().map(|e| format!("{} {}", elem, e)).collect::<Vec<_>>().join(", ");
                write!(f, "{} = array [{}]", dest, elems)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    Br { target: BlockId },
    CondBr { cond: Operand, if_true: BlockId, if_false: BlockId },
    Ret { value: Option<(IrType, Operand)> },
    Unreachable,
}

impl Terminator {
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Br { target } => vec![*target],
            Terminator::CondBr { if_true, if_false, .. } => vec![*if_true, *if_false],
            Terminator::Ret { .. } | Terminator::Unreachable => Vec::new(),
        }
    }

    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            Terminator::CondBr { cond, .. } => vec![cond],
            Terminator::Ret { value: Some((_, v)) } => vec![v],
            _ => Vec::new(),
        }
    }
}
