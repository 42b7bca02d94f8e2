//! file: core/src/ir/lower/context.rs
//! description: mutable state threaded through one codegen goal.
//!
//! `TranslationContext` owns the module under construction, the builder of
//! the function currently being lowered (the insertion cursor), the cache
//! of values already computed for AST nodes and the scoped environment of
//! local variable slots.

use std::collections::HashMap;

use super::err::LoweringError;
use super::function_builder::FunctionBuilder;
use crate::ast::NodeId;
use crate::ir::module::IrModule;
use crate::ir::op::{Instr, Terminator};
use crate::ir::value::{BlockId, IrType, Operand, Reg};
use crate::types::TypeSystem;

/// Stack slot holding a local variable.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSlot {
    pub ptr: Operand,
    pub ty: IrType,
}

pub struct TranslationContext<'a> {
    pub module: IrModule,
    pub ts: &'a dyn TypeSystem,
    builder: Option<FunctionBuilder>,
    values: HashMap<NodeId, Operand>,
    scopes: Vec<HashMap<String, LocalSlot>>,
    label_counter: usize,
    current_class: Option<String>,
    has_this: bool,
}

impl<'a> TranslationContext<'a> {
    pub fn new(module_name: impl Into<String>, ts: &'a dyn TypeSystem) -> Self {
        TranslationContext {
            module: IrModule::new(module_name),
            ts,
            builder: None,
            values: HashMap::new(),
            scopes: Vec::new(),
            label_counter: 0,
            current_class: None,
            has_this: false,
        }
    }

    pub fn into_module(self) -> IrModule {
        self.module
    }

    pub fn current_class(&self) -> Option<&str> {
        self.current_class.as_deref()
    }

    pub fn set_current_class(&mut self, class: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.current_class, class)
    }

    /// Open a function. Instance functions receive the receiver as `%arg0`.
    pub fn begin_function(&mut self, name: &str, params: Vec<IrType>, ret: IrType, has_this: bool) -> Result<(), LoweringError> {
        if let Some(open) = &self.builder {
            return Err(LoweringError::internal(format!(
                "cannot begin '{}' while '{}' is still open",
                name,
                open.name()
            )));
        }
        self.builder = Some(FunctionBuilder::new(name, params, ret));
        self.scopes = vec![HashMap::new()];
        self.has_this = has_this;
        Ok(())
    }

    pub fn end_function(&mut self) -> Result<(), LoweringError> {
        let builder = self
            .builder
            .take()
            .ok_or_else(|| LoweringError::internal("no function is open"))?;
        builder.finalize_into(&mut self.module);
        self.scopes.clear();
        self.has_this = false;
        Ok(())
    }

    pub fn builder(&mut self) -> Result<&mut FunctionBuilder, LoweringError> {
        self.builder
            .as_mut()
            .ok_or_else(|| LoweringError::internal("instruction emitted outside of a function"))
    }

    pub fn in_function(&self) -> bool {
        self.builder.is_some()
    }

    pub fn this_operand(&self) -> Result<Operand, LoweringError> {
        if self.has_this {
            Ok(Operand::Arg(0))
        } else {
            Err(LoweringError::internal("'this' used in a static context"))
        }
    }

    pub fn alloc_reg(&mut self) -> Result<Reg, LoweringError> {
        Ok(self.builder()?.alloc_reg())
    }

    pub fn emit(&mut self, instr: Instr) -> Result<(), LoweringError> {
        self.builder()?.emit(instr);
        Ok(())
    }

    pub fn terminate(&mut self, term: Terminator) -> Result<(), LoweringError> {
        self.builder()?.terminate(term);
        Ok(())
    }

    pub fn is_terminated(&self) -> bool {
        self.builder.as_ref().is_some_and(FunctionBuilder::is_terminated)
    }

    pub fn fresh_label(&mut self, prefix: &str) -> String {
        self.label_counter += 1;
        format!("{}{}", prefix, self.label_counter)
    }

    /// Append a block with a fresh label; the cursor does not move.
    pub fn append_block(&mut self, prefix: &str) -> Result<BlockId, LoweringError> {
        let label = self.fresh_label(prefix);
        Ok(self.builder()?.append_block(label))
    }

    pub fn position_at_end(&mut self, block: BlockId) -> Result<(), LoweringError> {
        self.builder()?.position_at_end(block);
        Ok(())
    }

    /// Record the value computed for `node`. Each node is translated once.
    pub fn cache_value(&mut self, node: NodeId, value: Operand) -> Result<(), LoweringError> {
        if self.values.contains_key(&node) {
            return Err(LoweringError::internal(format!("node {} translated twice", node)));
        }
        self.values.insert(node, value);
        Ok(())
    }

    pub fn value(&self, node: NodeId) -> Option<&Operand> {
        self.values.get(&node)
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Reserve a stack slot of type `ty` and return its address.
    pub fn alloc_slot(&mut self, ty: IrType) -> Result<Operand, LoweringError> {
        let dest = self.alloc_reg()?;
        self.emit(Instr::Alloca { dest, ty })?;
        Ok(Operand::Reg(dest))
    }

    /// Allocate a slot for a local variable in the innermost scope.
    pub fn declare_local(&mut self, name: &str, ty: IrType) -> Result<LocalSlot, LoweringError> {
        let ptr = self.alloc_slot(ty)?;
        let slot = LocalSlot { ptr, ty };
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| LoweringError::internal("local declared outside of a function"))?;
        scope.insert(name.to_string(), slot.clone());
        Ok(slot)
    }

    pub fn lookup_local(&self, name: &str) -> Option<&LocalSlot> {
        self.scopes.iter().rev().find_map(|s| s.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClassTable;

    #[test]
    fn value_cache_is_write_once() {
        let ts = ClassTable::new();
        let mut ctx = TranslationContext::new("m", &ts);
        ctx.cache_value(NodeId(1), Operand::int(IrType::I32, 1)).unwrap();
        assert!(ctx.cache_value(NodeId(1), Operand::int(IrType::I32, 2)).is_err());
        assert_eq!(ctx.value(NodeId(1)), Some(&Operand::int(IrType::I32, 1)));
    }

    #[test]
    fn inner_scopes_shadow_and_unwind() {
        let ts = ClassTable::new();
        let mut ctx = TranslationContext::new("m", &ts);
        ctx.begin_function("f", vec![], IrType::Void, false).unwrap();
        let outer = ctx.declare_local("x", IrType::I32).unwrap();
        ctx.push_scope();
        let inner = ctx.declare_local("x", IrType::I64).unwrap();
        assert_eq!(ctx.lookup_local("x"), Some(&inner));
        ctx.pop_scope();
        assert_eq!(ctx.lookup_local("x"), Some(&outer));
        ctx.end_function().unwrap();
        assert!(ctx.lookup_local("x").is_none());
    }

    #[test]
    fn labels_are_unique() {
        let ts = ClassTable::new();
        let mut ctx = TranslationContext::new("m", &ts);
        let a = ctx.fresh_label("and.rhs");
        let b = ctx.fresh_label("and.rhs");
        assert_ne!(a, b);
    }

    #[test]
    fn emitting_outside_a_function_fails() {
        let ts = ClassTable::new();
        let mut ctx = TranslationContext::new("m", &ts);
        assert!(ctx.alloc_slot(IrType::I32).is_err());
        assert!(ctx.this_operand().is_err());
    }
}
