//! file: core/src/ast/kind.rs
//! description: AST node kinds and operator enums.
//!
//! The tree is produced by the external front end with every expression
//! annotated with its resolved type. Nested member classes carry their
//! binary names (`Outer$Inner`); anonymous class bodies carry an empty name
//! until the desugar pipeline names them.

use serde::{Deserialize, Serialize};

use super::node::AstNode;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,     // +
    Sub,     // -
    Mul,     // *
    Div,     // /
    Mod,     // %
    BitAnd,  // &
    BitOr,   // |
    BitXor,  // ^
    Shl,     // <<
    Shr,     // >>
    Ushr,    // >>>
    Lt,      // <
    Le,      // <=
    Gt,      // >
    Ge,      // >=
    Eq,      // ==
    Ne,      // !=
    CondAnd, // &&
    CondOr,  // ||
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::Ushr => ">>>",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::CondAnd => "&&",
            BinaryOperator::CondOr => "||",
        }
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOperator::Shl | BinaryOperator::Shr | BinaryOperator::Ushr)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::CondAnd | BinaryOperator::CondOr)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Lt
                | BinaryOperator::Le
                | BinaryOperator::Gt
                | BinaryOperator::Ge
                | BinaryOperator::Eq
                | BinaryOperator::Ne
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Neg,    // -
    Plus,   // +
    Not,    // !
    BitNot, // ~
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CtorCallKind {
    Super,
    This,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Flags {
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_final: bool,
    /// Introduced by the compiler rather than written by the user.
    #[serde(default)]
    pub is_synthetic: bool,
}

impl Flags {
    pub fn none() -> Self {
        Flags::default()
    }

    pub fn statik() -> Self {
        Flags { is_static: true, ..Flags::default() }
    }

    pub fn synthetic_final() -> Self {
        Flags { is_final: true, is_synthetic: true, ..Flags::default() }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Param { name: name.into(), ty }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AstNodeKind {
    CompilationUnit { package: Option<String>, decls: Vec<AstNode> },

    ClassDecl {
        name: String,
        class_kind: ClassKind,
        flags: Flags,
        superclass: Option<String>,
        #[serde(default)]
        interfaces: Vec<String>,
        members: Vec<AstNode>,
    },
    FieldDecl { name: String, flags: Flags, field_ty: Type, init: Option<Box<AstNode>> },
    MethodDecl {
        name: String,
        flags: Flags,
        params: Vec<Param>,
        ret: Type,
        body: Option<Box<AstNode>>,
    },
    ConstructorDecl { flags: Flags, params: Vec<Param>, body: Box<AstNode> },
    Initializer { is_static: bool, body: Box<AstNode> },
    EnumConstant { name: String, ctor_params: Vec<Type>, args: Vec<AstNode> },

    LocalClassDecl { class: Box<AstNode> },
    Block { statements: Vec<AstNode> },
    LocalDecl { name: String, var_ty: Type, init: Option<Box<AstNode>> },
    If { condition: Box<AstNode>, then_branch: Box<AstNode>, else_branch: Option<Box<AstNode>> },
    While { condition: Box<AstNode>, body: Box<AstNode> },
    Return { value: Option<Box<AstNode>> },
    ExprStmt { expr: Box<AstNode> },
    /// `super(...)` or `this(...)` at the head of a constructor body.
    ConstructorCall { call_kind: CtorCallKind, owner: String, params: Vec<Type>, args: Vec<AstNode> },

    Binary { left: Box<AstNode>, op: BinaryOperator, right: Box<AstNode> },
    Unary { op: UnaryOperator, expr: Box<AstNode> },
    Cast { target: Type, expr: Box<AstNode> },
    Assign { target: Box<AstNode>, value: Box<AstNode> },
    Local { name: String },
    /// Field access; `target` is `None` for static fields of `owner`.
    Field { target: Option<Box<AstNode>>, owner: String, name: String },
    /// Method call resolved to `owner.name(params)`; `target` is `None`
    /// for static calls.
    Call {
        target: Option<Box<AstNode>>,
        owner: String,
        name: String,
        params: Vec<Type>,
        args: Vec<AstNode>,
    },
    /// Instance creation; `body` holds the `ClassDecl` of an anonymous class.
    New { class: String, ctor_params: Vec<Type>, args: Vec<AstNode>, body: Option<Box<AstNode>> },
    /// `this`, or `Q.this` when `qualifier` names an enclosing class.
    Special { qualifier: Option<String> },
    ArrayInit { elem_ty: Type, elements: Vec<AstNode> },

    IntLit { value: i32 },
    LongLit { value: i64 },
    FloatLit { value: f32 },
    DoubleLit { value: f64 },
    CharLit { value: u16 },
    BoolLit { value: bool },
    StringLit { value: String },
    NullLit,
}

/// One tag per node kind; the dispatch table is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    CompilationUnit,
    ClassDecl,
    FieldDecl,
    MethodDecl,
    ConstructorDecl,
    Initializer,
    EnumConstant,
    LocalClassDecl,
    Block,
    LocalDecl,
    If,
    While,
    Return,
    ExprStmt,
    ConstructorCall,
    Binary,
    Unary,
    Cast,
    Assign,
    Local,
    Field,
    Call,
    New,
    Special,
    ArrayInit,
    IntLit,
    LongLit,
    FloatLit,
    DoubleLit,
    CharLit,
    BoolLit,
    StringLit,
    NullLit,
}

impl AstNodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            AstNodeKind::CompilationUnit { .. } => NodeTag::CompilationUnit,
            AstNodeKind::ClassDecl { .. } => NodeTag::ClassDecl,
            AstNodeKind::FieldDecl { .. } => NodeTag::FieldDecl,
            AstNodeKind::MethodDecl { .. } => NodeTag::MethodDecl,
            AstNodeKind::ConstructorDecl { .. } => NodeTag::ConstructorDecl,
            AstNodeKind::Initializer { .. } => NodeTag::Initializer,
            AstNodeKind::EnumConstant { .. } => NodeTag::EnumConstant,
            AstNodeKind::LocalClassDecl { .. } => NodeTag::LocalClassDecl,
            AstNodeKind::Block { .. } => NodeTag::Block,
            AstNodeKind::LocalDecl { .. } => NodeTag::LocalDecl,
            AstNodeKind::If { .. } => NodeTag::If,
            AstNodeKind::While { .. } => NodeTag::While,
            AstNodeKind::Return { .. } => NodeTag::Return,
            AstNodeKind::ExprStmt { .. } => NodeTag::ExprStmt,
            AstNodeKind::ConstructorCall { .. } => NodeTag::ConstructorCall,
            AstNodeKind::Binary { .. } => NodeTag::Binary,
            AstNodeKind::Unary { .. } => NodeTag::Unary,
            AstNodeKind::Cast { .. } => NodeTag::Cast,
            AstNodeKind::Assign { .. } => NodeTag::Assign,
            AstNodeKind::Local { .. } => NodeTag::Local,
            AstNodeKind::Field { .. } => NodeTag::Field,
            AstNodeKind::Call { .. } => NodeTag::Call,
            AstNodeKind::New { .. } => NodeTag::New,
            AstNodeKind::Special { .. } => NodeTag::Special,
            AstNodeKind::ArrayInit { .. } => NodeTag::ArrayInit,
            AstNodeKind::IntLit { .. } => NodeTag::IntLit,
            AstNodeKind::LongLit { .. } => NodeTag::LongLit,
            AstNodeKind::FloatLit { .. } => NodeTag::FloatLit,
            AstNodeKind::DoubleLit { .. } => NodeTag::DoubleLit,
            AstNodeKind::CharLit { .. } => NodeTag::CharLit,
            AstNodeKind::BoolLit { .. } => NodeTag::BoolLit,
            AstNodeKind::StringLit { .. } => NodeTag::StringLit,
            AstNodeKind::NullLit => NodeTag::NullLit,
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            AstNodeKind::Binary { .. }
                | AstNodeKind::Unary { .. }
                | AstNodeKind::Cast { .. }
                | AstNodeKind::Assign { .. }
                | AstNodeKind::Local { .. }
                | AstNodeKind::Field { .. }
                | AstNodeKind::Call { .. }
                | AstNodeKind::New { .. }
                | AstNodeKind::Special { .. }
                | AstNodeKind::ArrayInit { .. }
                | AstNodeKind::IntLit { .. }
                | AstNodeKind::LongLit { .. }
                | AstNodeKind::FloatLit { .. }
                | AstNodeKind::DoubleLit { .. }
                | AstNodeKind::CharLit { .. }
                | AstNodeKind::BoolLit { .. }
                | AstNodeKind::StringLit { .. }
                | AstNodeKind::NullLit
        )
    }

    /// Name of a class declaration, if this is one.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            AstNodeKind::ClassDecl { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
