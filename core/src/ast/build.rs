//! Constructors for compiler-generated nodes. Everything built here has no
//! source location and, for expressions, carries its resolved type.

use super::kind::{AstNodeKind, BinaryOperator, ClassKind, CtorCallKind, Flags, Param};
use super::node::AstNode;
use crate::types::{STRING_CLASS, Type};

pub fn local(name: &str, ty: Type) -> AstNode {
    AstNode::synthetic(AstNodeKind::Local { name: name.to_string() }).typed(ty)
}

pub fn this_ref(class: &str) -> AstNode {
    AstNode::synthetic(AstNodeKind::Special { qualifier: None }).typed(Type::class(class))
}

pub fn qualified_this(class: &str) -> AstNode {
    AstNode::synthetic(AstNodeKind::Special { qualifier: Some(class.to_string()) }).typed(Type::class(class))
}

pub fn field(target: AstNode, owner: &str, name: &str, ty: Type) -> AstNode {
    AstNode::synthetic(AstNodeKind::Field {
        target: Some(Box::new(target)),
        owner: owner.to_string(),
        name: name.to_string(),
    })
    .typed(ty)
}

pub fn static_field(owner: &str, name: &str, ty: Type) -> AstNode {
    AstNode::synthetic(AstNodeKind::Field { target: None, owner: owner.to_string(), name: name.to_string() })
        .typed(ty)
}

pub fn assign(target: AstNode, value: AstNode) -> AstNode {
    let ty = target.ty.clone().unwrap_or(Type::Void);
    AstNode::synthetic(AstNodeKind::Assign { target: Box::new(target), value: Box::new(value) }).typed(ty)
}

pub fn expr_stmt(expr: AstNode) -> AstNode {
    AstNode::synthetic(AstNodeKind::ExprStmt { expr: Box::new(expr) })
}

pub fn block(statements: Vec<AstNode>) -> AstNode {
    AstNode::synthetic(AstNodeKind::Block { statements })
}

pub fn ctor_call(call_kind: CtorCallKind, owner: &str, params: Vec<Type>, args: Vec<AstNode>) -> AstNode {
    AstNode::synthetic(AstNodeKind::ConstructorCall { call_kind, owner: owner.to_string(), params, args })
}

pub fn int_lit(value: i32) -> AstNode {
    AstNode::synthetic(AstNodeKind::IntLit { value }).typed(Type::int())
}

pub fn bool_lit(value: bool) -> AstNode {
    AstNode::synthetic(AstNodeKind::BoolLit { value }).typed(Type::boolean())
}

pub fn string_lit(value: &str) -> AstNode {
    AstNode::synthetic(AstNodeKind::StringLit { value: value.to_string() }).typed(Type::string())
}

pub fn binary(left: AstNode, op: BinaryOperator, right: AstNode, ty: Type) -> AstNode {
    AstNode::synthetic(AstNodeKind::Binary { left: Box::new(left), op, right: Box::new(right) }).typed(ty)
}

pub fn cast(target: Type, expr: AstNode) -> AstNode {
    AstNode::synthetic(AstNodeKind::Cast { target: target.clone(), expr: Box::new(expr) }).typed(target)
}

pub fn call(target: AstNode, owner: &str, name: &str, params: Vec<Type>, args: Vec<AstNode>, ret: Type) -> AstNode {
    AstNode::synthetic(AstNodeKind::Call {
        target: Some(Box::new(target)),
        owner: owner.to_string(),
        name: name.to_string(),
        params,
        args,
    })
    .typed(ret)
}

pub fn static_call(owner: &str, name: &str, params: Vec<Type>, args: Vec<AstNode>, ret: Type) -> AstNode {
    AstNode::synthetic(AstNodeKind::Call {
        target: None,
        owner: owner.to_string(),
        name: name.to_string(),
        params,
        args,
    })
    .typed(ret)
}

pub fn new_object(class: &str, ctor_params: Vec<Type>, args: Vec<AstNode>) -> AstNode {
    AstNode::synthetic(AstNodeKind::New { class: class.to_string(), ctor_params, args, body: None })
        .typed(Type::class(class))
}

pub fn array_init(elem_ty: Type, elements: Vec<AstNode>) -> AstNode {
    AstNode::synthetic(AstNodeKind::ArrayInit { elem_ty: elem_ty.clone(), elements }).typed(Type::array_of(elem_ty))
}

/// `new java.lang.String(new char[] { ... })` for the UTF-16 units of `s`.
pub fn string_constructor(s: &str) -> AstNode {
    let chars = s
        .encode_utf16()
        .map(|unit| AstNode::synthetic(AstNodeKind::CharLit { value: unit }).typed(Type::char()))
        .collect();
    new_object(STRING_CLASS, vec![Type::array_of(Type::char())], vec![array_init(Type::char(), chars)])
}

pub fn field_decl(name: &str, flags: Flags, ty: Type, init: Option<AstNode>) -> AstNode {
    AstNode::synthetic(AstNodeKind::FieldDecl {
        name: name.to_string(),
        flags,
        field_ty: ty,
        init: init.map(Box::new),
    })
}

pub fn method_decl(name: &str, flags: Flags, params: Vec<Param>, ret: Type, body: AstNode) -> AstNode {
    AstNode::synthetic(AstNodeKind::MethodDecl {
        name: name.to_string(),
        flags,
        params,
        ret,
        body: Some(Box::new(body)),
    })
}

pub fn ctor_decl(flags: Flags, params: Vec<Param>, body: AstNode) -> AstNode {
    AstNode::synthetic(AstNodeKind::ConstructorDecl { flags, params, body: Box::new(body) })
}

pub fn class_decl(name: &str, class_kind: ClassKind, flags: Flags, superclass: Option<&str>, members: Vec<AstNode>) -> AstNode {
    AstNode::synthetic(AstNodeKind::ClassDecl {
        name: name.to_string(),
        class_kind,
        flags,
        superclass: superclass.map(str::to_string),
        interfaces: Vec::new(),
        members,
    })
}

/// The explicit `super(...)`/`this(...)` call heading a constructor body.
pub fn ctor_head(body: &AstNode) -> Option<CtorCallKind> {
    match &body.kind {
        AstNodeKind::Block { statements } => match statements.first().map(|s| &s.kind) {
            Some(AstNodeKind::ConstructorCall { call_kind, .. }) => Some(*call_kind),
            _ => None,
        },
        _ => None,
    }
}
