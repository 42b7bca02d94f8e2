//! file: core/src/ast/visit.rs
//! description: generic structural traversal over `AstNode` trees.
//!
//! The child layout of every node kind lives here twice: `map_children`
//! for owned rewrites and `children` for borrowed walks. A new kind must be
//! added to both; the tests below check that they agree.

use super::kind::AstNodeKind;
use super::node::AstNode;

fn map_box<E, F>(b: Box<AstNode>, f: &mut F) -> Result<Box<AstNode>, E>
where
    F: FnMut(AstNode) -> Result<AstNode, E>,
{
    Ok(Box::new(f(*b)?))
}

fn map_opt<E, F>(b: Option<Box<AstNode>>, f: &mut F) -> Result<Option<Box<AstNode>>, E>
where
    F: FnMut(AstNode) -> Result<AstNode, E>,
{
    match b {
        Some(b) => Ok(Some(map_box(b, f)?)),
        None => Ok(None),
    }
}

fn map_vec<E, F>(v: Vec<AstNode>, f: &mut F) -> Result<Vec<AstNode>, E>
where
    F: FnMut(AstNode) -> Result<AstNode, E>,
{
    v.into_iter().map(|n| f(n)).collect()
}

/// Rebuild `node` by applying `f` to each direct child in source order.
/// The node keeps its id, type and location.
pub fn map_children<E, F>(node: AstNode, f: &mut F) -> Result<AstNode, E>
where
    F: FnMut(AstNode) -> Result<AstNode, E>,
{
    let mut node = node;
    let kind = std::mem::replace(&mut node.kind, AstNodeKind::NullLit);
    node.kind = match kind {
        AstNodeKind::CompilationUnit { package, decls } => {
            AstNodeKind::CompilationUnit { package, decls: map_vec(decls, f)? }
        }
        AstNodeKind::ClassDecl { name, class_kind, flags, superclass, interfaces, members } => {
            AstNodeKind::ClassDecl {
                name,
                class_kind,
                flags,
                superclass,
                interfaces,
                members: map_vec(members, f)?,
            }
        }
        AstNodeKind::FieldDecl { name, flags, field_ty, init } => {
            AstNodeKind::FieldDecl { name, flags, field_ty, init: map_opt(init, f)? }
        }
        AstNodeKind::MethodDecl { name, flags, params, ret, body } => {
            AstNodeKind::MethodDecl { name, flags, params, ret, body: map_opt(body, f)? }
        }
        AstNodeKind::ConstructorDecl { flags, params, body } => {
            AstNodeKind::ConstructorDecl { flags, params, body: map_box(body, f)? }
        }
        AstNodeKind::Initializer { is_static, body } => {
            AstNodeKind::Initializer { is_static, body: map_box(body, f)? }
        }
        AstNodeKind::EnumConstant { name, ctor_params, args } => {
            AstNodeKind::EnumConstant { name, ctor_params, args: map_vec(args, f)? }
        }
        AstNodeKind::LocalClassDecl { class } => AstNodeKind::LocalClassDecl { class: map_box(class, f)? },
        AstNodeKind::Block { statements } => AstNodeKind::Block { statements: map_vec(statements, f)? },
        AstNodeKind::LocalDecl { name, var_ty, init } => {
            AstNodeKind::LocalDecl { name, var_ty, init: map_opt(init, f)? }
        }
        AstNodeKind::If { condition, then_branch, else_branch } => AstNodeKind::If {
            condition: map_box(condition, f)?,
            then_branch: map_box(then_branch, f)?,
            else_branch: map_opt(else_branch, f)?,
        },
        AstNodeKind::While { condition, body } => {
            AstNodeKind::While { condition: map_box(condition, f)?, body: map_box(body, f)? }
        }
        AstNodeKind::Return { value } => AstNodeKind::Return { value: map_opt(value, f)? },
        AstNodeKind::ExprStmt { expr } => AstNodeKind::ExprStmt { expr: map_box(expr, f)? },
        AstNodeKind::ConstructorCall { call_kind, owner, params, args } => {
            AstNodeKind::ConstructorCall { call_kind, owner, params, args: map_vec(args, f)? }
        }
        AstNodeKind::Binary { left, op, right } => {
            AstNodeKind::Binary { left: map_box(left, f)?, op, right: map_box(right, f)? }
        }
        AstNodeKind::Unary { op, expr } => AstNodeKind::Unary { op, expr: map_box(expr, f)? },
        AstNodeKind::Cast { target, expr } => AstNodeKind::Cast { target, expr: map_box(expr, f)? },
        AstNodeKind::Assign { target, value } => {
            AstNodeKind::Assign { target: map_box(target, f)?, value: map_box(value, f)? }
        }
        AstNodeKind::Field { target, owner, name } => {
            AstNodeKind::Field { target: map_opt(target, f)?, owner, name }
        }
        AstNodeKind::Call { target, owner, name, params, args } => AstNodeKind::Call {
            target: map_opt(target, f)?,
            owner,
            name,
            params,
            args: map_vec(args, f)?,
        },
        AstNodeKind::New { class, ctor_params, args, body } => AstNodeKind::New {
            class,
            ctor_params,
            args: map_vec(args, f)?,
            body: map_opt(body, f)?,
        },
        AstNodeKind::ArrayInit { elem_ty, elements } => {
            AstNodeKind::ArrayInit { elem_ty, elements: map_vec(elements, f)? }
        }
        leaf => leaf,
    };
    Ok(node)
}

/// Rewrite bottom-up: children first, then `f` on the rebuilt node.
pub fn rewrite_post_order<E, F>(node: AstNode, f: &mut F) -> Result<AstNode, E>
where
    F: FnMut(AstNode) -> Result<AstNode, E>,
{
    let node = map_children(node, &mut |child| rewrite_post_order(child, f))?;
    f(node)
}

/// Direct children in source order.
pub fn children(node: &AstNode) -> Vec<&AstNode> {
    fn push_opt<'a>(out: &mut Vec<&'a AstNode>, n: &'a Option<Box<AstNode>>) {
        if let Some(n) = n {
            out.push(n);
        }
    }

    let mut out = Vec::new();
    match &node.kind {
        AstNodeKind::CompilationUnit { decls, .. } => out.extend(decls.iter()),
        AstNodeKind::ClassDecl { members, .. } => out.extend(members.iter()),
        AstNodeKind::FieldDecl { init, .. } => push_opt(&mut out, init),
        AstNodeKind::MethodDecl { body, .. } => push_opt(&mut out, body),
        AstNodeKind::ConstructorDecl { body, .. } | AstNodeKind::Initializer { body, .. } => out.push(body),
        AstNodeKind::EnumConstant { args, .. } | AstNodeKind::ConstructorCall { args, .. } => {
            out.extend(args.iter())
        }
        AstNodeKind::LocalClassDecl { class } => out.push(class),
        AstNodeKind::Block { statements } => out.extend(statements.iter()),
        AstNodeKind::LocalDecl { init, .. } => push_opt(&mut out, init),
        AstNodeKind::If { condition, then_branch, else_branch } => {
            out.push(condition);
            out.push(then_branch);
            push_opt(&mut out, else_branch);
        }
        AstNodeKind::While { condition, body } => {
            out.push(condition);
            out.push(body);
        }
        AstNodeKind::Return { value } => push_opt(&mut out, value),
        AstNodeKind::ExprStmt { expr } | AstNodeKind::Unary { expr, .. } | AstNodeKind::Cast { expr, .. } => {
            out.push(expr)
        }
        AstNodeKind::Binary { left, right, .. } => {
            out.push(left);
            out.push(right);
        }
        AstNodeKind::Assign { target, value } => {
            out.push(target);
            out.push(value);
        }
        AstNodeKind::Field { target, .. } => push_opt(&mut out, target),
        AstNodeKind::Call { target, args, .. } => {
            push_opt(&mut out, target);
            out.extend(args.iter());
        }
        AstNodeKind::New { args, body, .. } => {
            out.extend(args.iter());
            push_opt(&mut out, body);
        }
        AstNodeKind::ArrayInit { elements, .. } => out.extend(elements.iter()),
        _ => {}
    }
    out
}

/// Pre-order walk over the whole subtree.
pub fn walk<'a>(node: &'a AstNode, f: &mut dyn FnMut(&'a AstNode)) {
    f(node);
    for child in children(node) {
        walk(child, f);
    }
}

/// True if any node in the subtree satisfies `pred`.
pub fn any_node(node: &AstNode, pred: &dyn Fn(&AstNode) -> bool) -> bool {
    pred(node) || children(node).into_iter().any(|c| any_node(c, pred))
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::ast::kind::{BinaryOperator, ClassKind, CtorCallKind, Flags, Param};
    use crate::ast::{NodeId, build};
    use crate::types::Type;

    fn mapped_child_ids(node: &AstNode) -> Vec<NodeId> {
        let mut seen = Vec::new();
        let _ = map_children::<Infallible, _>(node.clone(), &mut |child| {
            seen.push(child.id());
            Ok(child)
        });
        seen
    }

    fn sample() -> AstNode {
        let x = || build::local("x", Type::int());
        let cond = build::binary(x(), BinaryOperator::Lt, build::int_lit(3), Type::boolean());
        let call = build::static_call("demo.T", "f", vec![Type::int()], vec![x()], Type::Void);
        let branch = AstNode::synthetic(AstNodeKind::If {
            condition: Box::new(cond.clone()),
            then_branch: Box::new(build::expr_stmt(call)),
            else_branch: Some(Box::new(AstNode::synthetic(AstNodeKind::Return {
                value: Some(Box::new(build::new_object("demo.T", vec![Type::int()], vec![x()]))),
            }))),
        });
        let body = build::block(vec![
            AstNode::synthetic(AstNodeKind::LocalDecl {
                name: "y".into(),
                var_ty: Type::long(),
                init: Some(Box::new(build::cast(Type::long(), x()))),
            }),
            AstNode::synthetic(AstNodeKind::While {
                condition: Box::new(cond),
                body: Box::new(build::expr_stmt(build::assign(x(), build::int_lit(1)))),
            }),
            branch,
            build::expr_stmt(build::array_init(Type::int(), vec![build::int_lit(1), x()])),
        ]);
        let method = build::method_decl("m", Flags::none(), vec![Param::new("x", Type::int())], Type::Void, body);
        let ctor = build::ctor_decl(
            Flags::none(),
            vec![],
            build::block(vec![build::ctor_call(CtorCallKind::Super, "java.lang.Object", vec![], vec![])]),
        );
        let field = build::field_decl("k", Flags::statik(), Type::int(), Some(build::int_lit(2)));
        let class = build::class_decl("demo.T", ClassKind::Class, Flags::none(), None, vec![field, ctor, method]);
        AstNode::synthetic(AstNodeKind::CompilationUnit { package: Some("demo".into()), decls: vec![class] })
    }

    #[test]
    fn borrowed_and_owned_layouts_agree() {
        let tree = sample();
        let mut visited = 0;
        walk(&tree, &mut |node| {
            visited += 1;
            let borrowed: Vec<NodeId> = children(node).iter().map(|c| c.id()).collect();
            assert_eq!(borrowed, mapped_child_ids(node), "{:?}", node.kind.tag());
        });
        assert!(visited > 20);
    }

    #[test]
    fn map_children_keeps_the_parent_id() {
        let tree = sample();
        let id = tree.id();
        let out = map_children::<Infallible, _>(tree, &mut |child| Ok(child)).unwrap();
        assert_eq!(out.id(), id);
    }
}
