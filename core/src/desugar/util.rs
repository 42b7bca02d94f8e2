//! Tree helpers shared by the desugar stages.

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;

use crate::ast::visit::map_children;
use crate::ast::{AstNode, AstNodeKind, Flags, Param, build};
use crate::ir::lower::CLASS_INIT;
use crate::types::Type;

pub(crate) fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(v) => v,
        Err(never) => match never {},
    }
}

/// Move a node out of a slot, leaving a throwaway placeholder behind.
pub(crate) fn take(slot: &mut AstNode) -> AstNode {
    std::mem::replace(slot, AstNode::synthetic(AstNodeKind::NullLit))
}

pub(crate) fn members_mut(class: &mut AstNode) -> Option<&mut Vec<AstNode>> {
    match &mut class.kind {
        AstNodeKind::ClassDecl { members, .. } => Some(members),
        _ => None,
    }
}

pub(crate) fn is_anonymous_decl(node: &AstNode) -> bool {
    matches!(&node.kind, AstNodeKind::ClassDecl { name, .. } if name.is_empty())
}

/// The `super(...)`/`this(...)` statement heading a constructor body.
pub(crate) fn head_call_mut(body: &mut AstNode) -> Option<&mut AstNode> {
    match &mut body.kind {
        AstNodeKind::Block { statements } => statements
            .first_mut()
            .filter(|s| matches!(s.kind, AstNodeKind::ConstructorCall { .. })),
        _ => None,
    }
}

/// Insert `stmts` right after the constructor call heading `body`, or at
/// its start when there is none.
pub(crate) fn insert_after_head(mut body: AstNode, stmts: Vec<AstNode>) -> AstNode {
    if stmts.is_empty() {
        return body;
    }
    match &mut body.kind {
        AstNodeKind::Block { statements } => {
            let at = usize::from(matches!(
                statements.first().map(|s| &s.kind),
                Some(AstNodeKind::ConstructorCall { .. })
            ));
            statements.splice(at..at, stmts);
            body
        }
        _ => {
            let mut statements = stmts;
            statements.push(body);
            build::block(statements)
        }
    }
}

/// The static initializer method among `members`, created empty if the
/// class has none yet.
pub(crate) fn ensure_clinit(members: &mut Vec<AstNode>) -> &mut AstNode {
    let existing = members
        .iter()
        .position(|m| matches!(&m.kind, AstNodeKind::MethodDecl { name, .. } if name == CLASS_INIT));
    let index = match existing {
        Some(i) => i,
        None => {
            let flags = Flags { is_static: true, is_synthetic: true, ..Flags::none() };
            members.push(build::method_decl(CLASS_INIT, flags, vec![], Type::Void, build::block(vec![])));
            members.len() - 1
        }
    };
    &mut members[index]
}

/// `this.field = param` for a constructor parameter copied into a field.
pub(crate) fn store_param(class: &str, field: &str, ty: &Type) -> AstNode {
    let target = build::field(build::this_ref(class), class, field, ty.clone());
    build::expr_stmt(build::assign(target, build::local(field, ty.clone())))
}

fn renamed(name: &str, renames: &HashMap<String, String>) -> Option<String> {
    if let Some(to) = renames.get(name) {
        return Some(to.clone());
    }
    // Member classes of a renamed class: `Local$Inner`.
    let (head, rest) = name.split_once('$')?;
    if head.is_empty() {
        return None;
    }
    renames.get(head).map(|to| format!("{}${}", to, rest))
}

/// Rename class references throughout `node`: declared names, supertypes,
/// expression and declared types, owners, `new` targets and qualifiers.
///
/// The empty name stands for an anonymous class seen from inside its own
/// body. When it is being renamed, nested anonymous bodies are left alone
/// since their empty names refer to themselves.
pub fn rename_classes(node: AstNode, renames: &HashMap<String, String>) -> AstNode {
    let node = infallible(map_children(node, &mut |child| {
        if renames.contains_key("") && is_anonymous_decl(&child) {
            Ok(child)
        } else {
            Ok(rename_classes(child, renames))
        }
    }));
    rename_own(node, renames)
}

fn rename_own(mut node: AstNode, renames: &HashMap<String, String>) -> AstNode {
    let f = |name: &str| renamed(name, renames);
    let rename = |s: &mut String| {
        if let Some(to) = renamed(s, renames) {
            *s = to;
        }
    };
    let rename_types = |types: &mut Vec<Type>| {
        for t in types.iter_mut() {
            *t = t.map_class_names(&f);
        }
    };
    let rename_params = |params: &mut Vec<Param>| {
        for p in params.iter_mut() {
            p.ty = p.ty.map_class_names(&f);
        }
    };

    node.ty = node.ty.map(|t| t.map_class_names(&f));
    match &mut node.kind {
        AstNodeKind::ClassDecl { name, superclass, interfaces, .. } => {
            rename(name);
            if let Some(sup) = superclass {
                rename(sup);
            }
            interfaces.iter_mut().for_each(rename);
        }
        AstNodeKind::FieldDecl { field_ty, .. } => *field_ty = field_ty.map_class_names(&f),
        AstNodeKind::MethodDecl { params, ret, .. } => {
            rename_params(params);
            *ret = ret.map_class_names(&f);
        }
        AstNodeKind::ConstructorDecl { params, .. } => rename_params(params),
        AstNodeKind::EnumConstant { ctor_params, .. } => rename_types(ctor_params),
        AstNodeKind::LocalDecl { var_ty, .. } => *var_ty = var_ty.map_class_names(&f),
        AstNodeKind::ConstructorCall { owner, params, .. } | AstNodeKind::Call { owner, params, .. } => {
            rename(owner);
            rename_types(params);
        }
        AstNodeKind::Cast { target, .. } => *target = target.map_class_names(&f),
        AstNodeKind::Field { owner, .. } => rename(owner),
        AstNodeKind::New { class, ctor_params, .. } => {
            rename(class);
            rename_types(ctor_params);
        }
        AstNodeKind::Special { qualifier: Some(q) } => rename(q),
        AstNodeKind::ArrayInit { elem_ty, .. } => *elem_ty = elem_ty.map_class_names(&f),
        _ => {}
    }
    node
}

/// Rewrite every reference to a local variable that `node` does not bind
/// itself. Method and constructor parameters, block-scoped declarations
/// (visible after their initializer) are bindings.
pub fn map_free_locals(node: AstNode, f: &mut dyn FnMut(&str, AstNode) -> AstNode) -> AstNode {
    FreeLocals { scopes: Vec::new(), f }.rewrite(node)
}

/// Free locals of `node` with their types, in order of first use.
pub fn free_locals(node: &AstNode) -> Vec<(String, Option<Type>)> {
    let mut out: Vec<(String, Option<Type>)> = Vec::new();
    map_free_locals(node.clone(), &mut |name, local| {
        if !out.iter().any(|(n, _)| n == name) {
            out.push((name.to_string(), local.ty.clone()));
        }
        local
    });
    out
}

struct FreeLocals<'f> {
    scopes: Vec<HashSet<String>>,
    f: &'f mut dyn FnMut(&str, AstNode) -> AstNode,
}

impl FreeLocals<'_> {
    fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().any(|s| s.contains(name))
    }

    fn rewrite(&mut self, node: AstNode) -> AstNode {
        match &node.kind {
            AstNodeKind::Local { name } => {
                if self.is_bound(name) {
                    node
                } else {
                    let name = name.clone();
                    (self.f)(&name, node)
                }
            }
            AstNodeKind::MethodDecl { params, .. } | AstNodeKind::ConstructorDecl { params, .. } => {
                let scope = params.iter().map(|p| p.name.clone()).collect();
                self.scoped(scope, node)
            }
            AstNodeKind::Block { .. } => self.scoped(HashSet::new(), node),
            AstNodeKind::LocalDecl { name, .. } => {
                let name = name.clone();
                let node = self.children(node);
                match self.scopes.last_mut() {
                    Some(scope) => {
                        scope.insert(name);
                    }
                    None => self.scopes.push(HashSet::from([name])),
                }
                node
            }
            _ => self.children(node),
        }
    }

    fn scoped(&mut self, scope: HashSet<String>, node: AstNode) -> AstNode {
        self.scopes.push(scope);
        let node = self.children(node);
        self.scopes.pop();
        node
    }

    fn children(&mut self, node: AstNode) -> AstNode {
        infallible(map_children(node, &mut |child| Ok(self.rewrite(child))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassKind, Flags};

    #[test]
    fn rename_reaches_member_classes_of_renamed_class() {
        let renames = HashMap::from([("Local".to_string(), "demo.A$1Local".to_string())]);
        assert_eq!(renamed("Local$Inner", &renames).as_deref(), Some("demo.A$1Local$Inner"));
        assert_eq!(renamed("demo.Other", &renames), None);
    }

    #[test]
    fn locals_declared_in_body_are_not_free() {
        let body = build::block(vec![
            AstNode::synthetic(AstNodeKind::LocalDecl {
                name: "y".to_string(),
                var_ty: Type::int(),
                init: Some(Box::new(build::local("x", Type::int()))),
            }),
            build::expr_stmt(build::local("y", Type::int())),
        ]);
        let method = build::method_decl("run", Flags::none(), vec![], Type::Void, body);
        let class = build::class_decl("C", ClassKind::Class, Flags::none(), None, vec![method]);
        let free = free_locals(&class);
        assert_eq!(free, vec![("x".to_string(), Some(Type::int()))]);
    }

    #[test]
    fn parameters_are_bound() {
        let body = build::block(vec![build::expr_stmt(build::local("p", Type::int()))]);
        let method = build::method_decl("run", Flags::none(), vec![Param::new("p", Type::int())], Type::Void, body);
        assert!(free_locals(&method).is_empty());
    }
}
