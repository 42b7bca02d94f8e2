use std::fmt;

use super::op::{Instr, Terminator};
use super::value::{BlockId, IrType, Operand};

/// Field layout of one class, inherited fields first.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLayout {
    pub name: String,
    pub superclass: Option<String>,
    pub fields: Vec<(String, IrType)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    pub name: String,
    pub ty: IrType,
    pub init: Operand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub label: String,
    pub instrs: Vec<Instr>,
    pub terminator: Option<Terminator>,
}

impl Block {
    pub fn new(label: impl Into<String>) -> Self {
        Block { label: label.into(), instrs: Vec::new(), terminator: None }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<IrType>,
    pub ret: IrType,
    pub blocks: Vec<Block>,
}

impl Function {
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.0)
    }

    pub fn block_by_label(&self, label: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.label == label)
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instr> {
        self.blocks.iter().flat_map(|b| b.instrs.iter())
    }

    fn label_of(&self, id: BlockId) -> &str {
        self.blocks.get(id.0).map(|b| b.label.as_str()).unwrap_or("<invalid>")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrModule {
    pub name: String,
    pub classes: Vec<ClassLayout>,
    pub globals: Vec<Global>,
    pub functions: Vec<Function>,
}

impl IrModule {
    pub fn new(name: impl Into<String>) -> Self {
        IrModule { name: name.into(), ..IrModule::default() }
    }

    pub fn class(&self, name: &str) -> Option<&ClassLayout> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn global(&self, name: &str) -> Option<&Global> {
        self.globals.iter().find(|g| g.name == name)
    }

    pub fn add_global(&mut self, global: Global) {
        if self.global(&global.name).is_none() {
            self.globals.push(global);
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{} %arg{}", t, i))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "define {} @\"{}\"({}) {{", self.ret, self.name, params)?;
        for block in &self.blocks {
            writeln!(f, "{}:", block.label)?;
            for instr in &block.instrs {
                writeln!(f, "  {}", instr)?;
            }
            match &block.terminator {
                Some(Terminator::Br { target }) => writeln!(f, "  br label %{}", self.label_of(*target))?,
                Some(Terminator::CondBr { cond, if_true, if_false }) => writeln!(
                    f,
                    "  br i1 {}, label %{}, label %{}",
                    cond,
                    self.label_of(*if_true),
                    self.label_of(*if_false)
                )?,
                Some(Terminator::Ret { value: Some((ty, v)) }) => writeln!(f, "  ret {} {}", ty, v)?,
                Some(Terminator::Ret { value: None }) => writeln!(f, "  ret void")?,
                Some(Terminator::Unreachable) => writeln!(f, "  unreachable")?,
                None => writeln!(f, "  ; unterminated")?,
            }
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        for class in &self.classes {
            let fields = class.fields.iter().map(|(_, t)| t.to_string()).collect::<Vec<_>>().join(", ");
            writeln!(f, "%\"{}\" = type {{ {} }}", class.name, fields)?;
        }
        for global in &self.globals {
            writeln!(f, "@\"{}\" = global {} {}", global.name, global.ty, global.init)?;
        }
        for func in &self.functions {
            writeln!(f)?;
            write!(f, "{}", func)?;
        }
        Ok(())
    }
}
