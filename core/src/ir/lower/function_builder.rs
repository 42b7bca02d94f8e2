use crate::ir::module::{Block, Function, IrModule};
use crate::ir::op::{Instr, Terminator};
use crate::ir::value::{BlockId, IrType, Reg};

/// A per-function lowering helper: a register allocator, the function's
/// blocks and the insertion cursor. After lowering a function, it is
/// finalized into the parent `IrModule`.
pub struct FunctionBuilder {
    name: String,
    params: Vec<IrType>,
    ret: IrType,
    next_reg: u32,
    blocks: Vec<Block>,
    current: BlockId,
    dead_blocks: usize,
}

impl FunctionBuilder {
    /// Start a function with an empty `entry` block under the cursor.
    pub fn new(name: impl Into<String>, params: Vec<IrType>, ret: IrType) -> Self {
        FunctionBuilder {
            name: name.into(),
            params,
            ret,
            next_reg: 0,
            blocks: vec![Block::new("entry")],
            current: BlockId(0),
            dead_blocks: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ret(&self) -> IrType {
        self.ret
    }

    pub fn alloc_reg(&mut self) -> Reg {
        let r = Reg(self.next_reg);
        self.next_reg = self.next_reg.wrapping_add(1);
        r
    }

    pub fn append_block(&mut self, label: impl Into<String>) -> BlockId {
        self.blocks.push(Block::new(label));
        BlockId(self.blocks.len() - 1)
    }

    pub fn position_at_end(&mut self, block: BlockId) {
        self.current = block;
    }

    pub fn current_block(&self) -> BlockId {
        self.current
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.0)
    }

    pub fn is_terminated(&self) -> bool {
        self.blocks[self.current.0].is_terminated()
    }

    /// Append to the current block. Code following a terminator (after a
    /// `return` inside a block, say) lands in a fresh unreachable block.
    pub fn emit(&mut self, instr: Instr) {
        if self.is_terminated() {
            self.dead_blocks += 1;
            let dead = self.append_block(format!("dead{}", self.dead_blocks));
            self.current = dead;
        }
        self.blocks[self.current.0].instrs.push(instr);
    }

    /// Terminate the current block; a block that is already terminated
    /// keeps its first terminator.
    pub fn terminate(&mut self, term: Terminator) {
        let block = &mut self.blocks[self.current.0];
        if block.terminator.is_none() {
            block.terminator = Some(term);
        }
    }

    /// Close every open block (`ret void` for void functions, otherwise
    /// `unreachable`) and append the function to `module`.
    pub fn finalize_into(self, module: &mut IrModule) {
        let fallthrough = if self.ret == IrType::Void {
            Terminator::Ret { value: None }
        } else {
            Terminator::Unreachable
        };
        let mut blocks = self.blocks;
        for block in blocks.iter_mut().filter(|b| b.terminator.is_none()) {
            block.terminator = Some(fallthrough.clone());
        }
        module.functions.push(Function { name: self.name, params: self.params, ret: self.ret, blocks });
    }
}
