use std::fmt;

/// A virtual register local to one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reg(pub u32);

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Index of a basic block within its function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrType {
    I1,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Ptr,
    Void,
}

impl IrType {
    pub fn is_float(self) -> bool {
        matches!(self, IrType::F32 | IrType::F64)
    }

    pub fn is_int(self) -> bool {
        matches!(self, IrType::I1 | IrType::I8 | IrType::I16 | IrType::I32 | IrType::I64)
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IrType::I1 => "i1",
            IrType::I8 => "i8",
            IrType::I16 => "i16",
            IrType::I32 => "i32",
            IrType::I64 => "i64",
            IrType::F32 => "float",
            IrType::F64 => "double",
            IrType::Ptr => "ptr",
            IrType::Void => "void",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Reg(Reg),
    /// The n-th parameter of the current function.
    Arg(u32),
    ConstInt { ty: IrType, value: i64 },
    ConstFloat { ty: IrType, value: f64 },
    Null,
    /// Address of a module-level global.
    Global(String),
}

impl Operand {
    pub fn int(ty: IrType, value: i64) -> Operand {
        Operand::ConstInt { ty, value }
    }

    pub fn bool(value: bool) -> Operand {
        Operand::ConstInt { ty: IrType::I1, value: i64::from(value) }
    }

    pub fn as_reg(&self) -> Option<Reg> {
        match self {
            Operand::Reg(r) => Some(*r),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(r) => write!(f, "{}", r),
            Operand::Arg(n) => write!(f, "%arg{}", n),
            Operand::ConstInt { ty: IrType::I1, value } => write!(f, "{}", *value != 0),
            Operand::ConstInt { value, .. } => write!(f, "{}", value),
            Operand::ConstFloat { value, .. } => write!(f, "{:e}", value),
            Operand::Null => f.write_str("null"),
            Operand::Global(name) => write!(f, "@\"{}\"", name),
        }
    }
}
