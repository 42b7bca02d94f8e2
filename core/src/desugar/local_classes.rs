//! Turns local and anonymous classes into members of their enclosing class.
//!
//! Every local variable a class body uses without declaring it is
//! captured: the class gets a `capture$x` field, each constructor takes
//! the value as an extra trailing parameter, and each creation site passes
//! the local along. Inside the class, uses read the field (or, within a
//! constructor, the parameter). The class is then hoisted into the class
//! that declares the enclosing method, static when that method is.

use log::debug;

use super::err::DesugarError;
use super::util::{
    free_locals, head_call_mut, infallible, insert_after_head, map_free_locals, members_mut, store_param, take,
};
use super::{Stage, StageContext};
use crate::ast::visit::{children, rewrite_post_order};
use crate::ast::{AstNode, AstNodeKind, CtorCallKind, Flags, Param, build};
use crate::types::Type;

pub struct DesugarLocalClasses;

impl Stage for DesugarLocalClasses {
    fn name(&self) -> &'static str {
        "desugar-local-classes"
    }

    fn run(&self, mut unit: AstNode, _cx: &StageContext<'_>) -> Result<AstNode, DesugarError> {
        if let AstNodeKind::CompilationUnit { decls, .. } = &mut unit.kind {
            for decl in decls.iter_mut().filter(|d| d.kind.class_name().is_some()) {
                *decl = desugar_class(take(decl))?;
            }
        }
        Ok(unit)
    }
}

pub fn capture_name(local: &str) -> String {
    format!("capture${}", local)
}

/// Hoist the local classes of every method and constructor of `class`,
/// then of the hoisted and member classes themselves.
fn desugar_class(mut class: AstNode) -> Result<AstNode, DesugarError> {
    let Some(members) = members_mut(&mut class) else {
        return Ok(class);
    };
    let mut i = 0;
    while i < members.len() {
        let member = take(&mut members[i]);
        let (member, hoisted) = match &member.kind {
            AstNodeKind::ClassDecl { .. } => (desugar_class(member)?, Vec::new()),
            AstNodeKind::MethodDecl { .. } | AstNodeKind::ConstructorDecl { .. } => hoist_from_function(member)?,
            _ => (member, Vec::new()),
        };
        members[i] = member;
        members.extend(hoisted);
        i += 1;
    }
    Ok(class)
}

fn hoist_from_function(mut function: AstNode) -> Result<(AstNode, Vec<AstNode>), DesugarError> {
    let is_static = matches!(&function.kind, AstNodeKind::MethodDecl { flags, .. } if flags.is_static);
    let mut hoisted = Vec::new();
    loop {
        let Some(decl) = first_local_class(&function) else {
            break;
        };
        let name = decl.kind.class_name().unwrap_or_default().to_string();
        let captures = typed_captures(decl)?;
        debug!("hoisting {} (captures {:?})", name, captures.iter().map(|(n, _)| n).collect::<Vec<_>>());

        function = pass_captures(function, &name, &captures);
        let (rest, class) = remove_decl(function, &name);
        function = rest;
        let class = class.ok_or_else(|| DesugarError::internal(format!("declaration of '{}' vanished", name)))?;
        hoisted.push(capture_fields(class, &name, &captures, is_static));
    }
    Ok((function, hoisted))
}

/// The outermost local or anonymous class declared in `node`, in pre-order.
fn first_local_class(node: &AstNode) -> Option<&AstNode> {
    match &node.kind {
        AstNodeKind::LocalClassDecl { class } => return Some(class.as_ref()),
        AstNodeKind::New { body: Some(body), .. } => return Some(body.as_ref()),
        _ => {}
    }
    children(node).into_iter().find_map(first_local_class)
}

fn typed_captures(decl: &AstNode) -> Result<Vec<(String, Type)>, DesugarError> {
    free_locals(decl)
        .into_iter()
        .map(|(name, ty)| match ty {
            Some(ty) => Ok((name, ty)),
            None => Err(DesugarError::internal(format!("captured local '{}' has no type", name))),
        })
        .collect()
}

/// Append the captured locals to every `new C(...)` and every
/// `super(...)` into `C`.
fn pass_captures(function: AstNode, class: &str, captures: &[(String, Type)]) -> AstNode {
    if captures.is_empty() {
        return function;
    }
    let locals = || captures.iter().map(|(n, ty)| build::local(n, ty.clone()));
    let types = || captures.iter().map(|(_, ty)| ty.clone());
    infallible(rewrite_post_order(function, &mut |mut node: AstNode| {
        match &mut node.kind {
            AstNodeKind::New { class: target, ctor_params, args, .. } if target.as_str() == class => {
                ctor_params.extend(types());
                args.extend(locals());
            }
            AstNodeKind::ConstructorCall { call_kind: CtorCallKind::Super, owner, params, args } if owner.as_str() == class => {
                params.extend(types());
                args.extend(locals());
            }
            _ => {}
        }
        Ok(node)
    }))
}

/// Cut the declaration of `class` out of `function`.
fn remove_decl(function: AstNode, class: &str) -> (AstNode, Option<AstNode>) {
    let mut taken = None;
    let function = infallible(rewrite_post_order(function, &mut |mut node: AstNode| {
        match &mut node.kind {
            AstNodeKind::Block { statements } => {
                let found = statements
                    .iter()
                    .position(|s| matches!(&s.kind, AstNodeKind::LocalClassDecl { class: decl } if declares(decl, class)));
                if let Some(i) = found {
                    if let AstNodeKind::LocalClassDecl { class: decl } = statements.remove(i).kind {
                        taken = Some(*decl);
                    }
                }
            }
            AstNodeKind::New { body, .. } if body.as_deref().is_some_and(|b| declares(b, class)) => {
                taken = body.take().map(|b| *b);
            }
            _ => {}
        }
        Ok(node)
    }));
    (function, taken)
}

fn declares(node: &AstNode, class: &str) -> bool {
    node.kind.class_name() == Some(class)
}

fn relocated(mut replacement: AstNode, original: &AstNode) -> AstNode {
    replacement.location = original.location.clone();
    replacement
}

/// Store the captured values in fields of the hoisted class.
fn capture_fields(mut class: AstNode, name: &str, captures: &[(String, Type)], is_static: bool) -> AstNode {
    if let AstNodeKind::ClassDecl { flags, .. } = &mut class.kind {
        flags.is_static = is_static;
    }
    if captures.is_empty() {
        return class;
    }
    let Some(members) = members_mut(&mut class) else {
        return class;
    };

    for member in members.iter_mut() {
        let in_ctor = matches!(member.kind, AstNodeKind::ConstructorDecl { .. });
        *member = map_free_locals(take(member), &mut |local, node| {
            let Some((_, ty)) = captures.iter().find(|(n, _)| n == local) else {
                return node;
            };
            let field = capture_name(local);
            let replacement = if in_ctor {
                build::local(&field, ty.clone())
            } else {
                build::field(build::qualified_this(name), name, &field, ty.clone())
            };
            relocated(replacement, &node)
        });
    }

    for member in members.iter_mut() {
        let AstNodeKind::ConstructorDecl { params, body, .. } = &mut member.kind else {
            continue;
        };
        params.extend(captures.iter().map(|(n, ty)| Param::new(capture_name(n), ty.clone())));
        let delegated = match head_call_mut(body) {
            Some(head) => match &mut head.kind {
                AstNodeKind::ConstructorCall { call_kind: CtorCallKind::This, params, args, .. } => {
                    params.extend(captures.iter().map(|(_, ty)| ty.clone()));
                    args.extend(captures.iter().map(|(n, ty)| build::local(&capture_name(n), ty.clone())));
                    true
                }
                _ => false,
            },
            None => false,
        };
        if !delegated {
            let stores = captures.iter().map(|(n, ty)| store_param(name, &capture_name(n), ty)).collect();
            **body = insert_after_head(take(body), stores);
        }
    }

    members.extend(
        captures
            .iter()
            .map(|(n, ty)| build::field_decl(&capture_name(n), Flags::synthetic_final(), ty.clone(), None)),
    );
    class
}
