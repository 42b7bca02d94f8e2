//! Structural checks run before a module is handed to an emitter.

use std::collections::HashSet;

use super::err::IrError;
use super::module::{Function, IrModule};
use super::value::Operand;

/// Check every function of `module`: each block ends in a terminator,
/// branch targets exist, and every register read is defined somewhere in
/// the same function.
pub fn verify_module(module: &IrModule) -> Result<(), IrError> {
    let mut names = HashSet::new();
    for func in &module.functions {
        if !names.insert(func.name.as_str()) {
            return Err(IrError::verification(&func.name, "defined more than once"));
        }
        verify_function(func)?;
    }
    Ok(())
}

pub fn verify_function(func: &Function) -> Result<(), IrError> {
    if func.blocks.is_empty() {
        return Err(IrError::verification(&func.name, "function has no blocks"));
    }

    let defined: HashSet<_> = func.instructions().filter_map(|i| i.dest()).collect();
    let check = |op: &Operand| -> Result<(), IrError> {
        match op {
            Operand::Reg(r) if !defined.contains(r) => {
                Err(IrError::verification(&func.name, format!("use of undefined register {}", r)))
            }
            Operand::Arg(n) if *n as usize >= func.params.len() => {
                Err(IrError::verification(&func.name, format!("argument %arg{} out of range", n)))
            }
            _ => Ok(()),
        }
    };

    for block in &func.blocks {
        for instr in &block.instrs {
            for op in instr.operands() {
                check(op)?;
            }
        }
        let term = block
            .terminator
            .as_ref()
            .ok_or_else(|| IrError::verification(&func.name, format!("block '{}' is not terminated", block.label)))?;
        for op in term.operands() {
            check(op)?;
        }
        for succ in term.successors() {
            if func.block(succ).is_none() {
                return Err(IrError::verification(
                    &func.name,
                    format!("block '{}' branches to missing block #{}", block.label, succ.0),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::module::Block;
    use crate::ir::op::{Instr, Terminator};
    use crate::ir::value::{BlockId, IrType, Reg};

    fn func(blocks: Vec<Block>) -> Function {
        Function { name: "f".into(), params: vec![], ret: IrType::Void, blocks }
    }

    #[test]
    fn rejects_unterminated_block() {
        let f = func(vec![Block::new("entry")]);
        let err = verify_function(&f).unwrap_err();
        assert!(err.to_string().contains("not terminated"));
    }

    #[test]
    fn rejects_branch_to_missing_block() {
        let mut entry = Block::new("entry");
        entry.terminator = Some(Terminator::Br { target: BlockId(3) });
        assert!(verify_function(&func(vec![entry])).is_err());
    }

    #[test]
    fn rejects_undefined_register() {
        let mut entry = Block::new("entry");
        entry.instrs.push(Instr::Store {
            ty: IrType::I32,
            value: Operand::Reg(Reg(7)),
            ptr: Operand::Global("g".into()),
        });
        entry.terminator = Some(Terminator::Ret { value: None });
        let err = verify_function(&func(vec![entry])).unwrap_err();
        assert!(err.to_string().contains("%7"));
    }
}
