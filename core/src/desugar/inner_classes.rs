//! Makes enclosing instances explicit and flattens nested classes.
//!
//! A non-static member class `Outer$Inner` gets a `this$0` field holding
//! its enclosing `Outer`, set from a leading constructor parameter. Every
//! `new Outer$Inner(...)` and every `super(...)` into it passes the
//! enclosing instance. `Q.this` becomes plain `this` or a chain of
//! `this$0` reads; inside constructors the first hop reads the parameter.
//! Afterwards all classes sit at the top level of the unit.

use std::collections::HashMap;

use super::err::DesugarError;
use super::util::{head_call_mut, infallible, insert_after_head, members_mut, store_param, take};
use super::{Stage, StageContext};
use crate::ast::visit::{map_children, rewrite_post_order, walk};
use crate::ast::{AstNode, AstNodeKind, ClassKind, CtorCallKind, Flags, Param, build};
use crate::types::Type;

pub const OUTER_FIELD: &str = "this$0";

pub struct DesugarInnerClasses;

impl Stage for DesugarInnerClasses {
    fn name(&self) -> &'static str {
        "desugar-inner-classes"
    }

    fn run(&self, unit: AstNode, _cx: &StageContext<'_>) -> Result<AstNode, DesugarError> {
        let outers = inner_classes(&unit);
        let unit = infallible(rewrite_post_order(unit, &mut |node: AstNode| Ok(pass_outer_instance(node, &outers))));
        let unit = QualifiedThis { outers: &outers }.resolve(unit, None, false)?;
        Ok(flatten(unit))
    }
}

/// Non-static member classes mapped to their immediately enclosing class.
fn inner_classes(unit: &AstNode) -> HashMap<String, String> {
    let mut outers = HashMap::new();
    walk(unit, &mut |node| {
        let AstNodeKind::ClassDecl { name: outer, class_kind, members, .. } = &node.kind else {
            return;
        };
        if *class_kind == ClassKind::Interface {
            return;
        }
        for member in members {
            if let AstNodeKind::ClassDecl { name, class_kind, flags, .. } = &member.kind {
                if !flags.is_static && *class_kind == ClassKind::Class {
                    outers.insert(name.clone(), outer.clone());
                }
            }
        }
    });
    outers
}

fn pass_outer_instance(mut node: AstNode, outers: &HashMap<String, String>) -> AstNode {
    match &mut node.kind {
        AstNodeKind::New { class, ctor_params, args, .. } => {
            if let Some(outer) = outers.get(class.as_str()) {
                ctor_params.insert(0, Type::class(outer.as_str()));
                args.insert(0, build::qualified_this(outer));
            }
        }
        AstNodeKind::ConstructorCall { call_kind: CtorCallKind::Super, owner, params, args } => {
            if let Some(outer) = outers.get(owner.as_str()) {
                params.insert(0, Type::class(outer.as_str()));
                args.insert(0, build::qualified_this(outer));
            }
        }
        AstNodeKind::ClassDecl { name, members, .. } => {
            if let Some(outer) = outers.get(name.as_str()) {
                add_outer_field(name, outer, members);
            }
        }
        _ => {}
    }
    node
}

fn add_outer_field(class: &str, outer: &str, members: &mut Vec<AstNode>) {
    let outer_ty = Type::class(outer);
    for member in members.iter_mut() {
        let AstNodeKind::ConstructorDecl { params, body, .. } = &mut member.kind else {
            continue;
        };
        params.insert(0, Param::new(OUTER_FIELD, outer_ty.clone()));
        let delegated = match head_call_mut(body).map(|head| &mut head.kind) {
            Some(AstNodeKind::ConstructorCall { call_kind: CtorCallKind::This, params, args, .. }) => {
                params.insert(0, outer_ty.clone());
                args.insert(0, build::local(OUTER_FIELD, outer_ty.clone()));
                true
            }
            _ => false,
        };
        if !delegated {
            **body = insert_after_head(take(body), vec![store_param(class, OUTER_FIELD, &outer_ty)]);
        }
    }
    members.insert(0, build::field_decl(OUTER_FIELD, Flags::synthetic_final(), outer_ty, None));
}

struct QualifiedThis<'a> {
    outers: &'a HashMap<String, String>,
}

impl QualifiedThis<'_> {
    fn resolve(&self, node: AstNode, class: Option<&str>, in_ctor: bool) -> Result<AstNode, DesugarError> {
        match &node.kind {
            AstNodeKind::ClassDecl { name, .. } => {
                let name = name.clone();
                map_children(node, &mut |c| self.resolve(c, Some(name.as_str()), false))
            }
            AstNodeKind::ConstructorDecl { .. } => map_children(node, &mut |c| self.resolve(c, class, true)),
            AstNodeKind::MethodDecl { .. } => map_children(node, &mut |c| self.resolve(c, class, false)),
            AstNodeKind::Special { qualifier: Some(target) } => {
                let target = target.clone();
                self.chain(node, class, &target, in_ctor)
            }
            _ => map_children(node, &mut |c| self.resolve(c, class, in_ctor)),
        }
    }

    /// `target.this` seen from inside `class`.
    fn chain(&self, node: AstNode, class: Option<&str>, target: &str, in_ctor: bool) -> Result<AstNode, DesugarError> {
        let location = node.location.clone();
        let from = class.ok_or_else(|| DesugarError::internal("qualified 'this' outside of a class"))?;
        let mut expr = build::this_ref(from);
        let mut cur = from.to_string();
        let mut first_hop = true;
        while cur != target {
            let outer = self
                .outers
                .get(&cur)
                .ok_or_else(|| DesugarError::broken_chain(from, target).at(location.as_ref()))?;
            let outer_ty = Type::class(outer.as_str());
            expr = if first_hop && in_ctor {
                build::local(OUTER_FIELD, outer_ty)
            } else {
                build::field(expr, &cur, OUTER_FIELD, outer_ty)
            };
            first_hop = false;
            cur = outer.clone();
        }
        expr.location = location;
        Ok(expr)
    }
}

/// Move every nested class to the top level, each right after its
/// enclosing class.
fn flatten(mut unit: AstNode) -> AstNode {
    if let AstNodeKind::CompilationUnit { decls, .. } = &mut unit.kind {
        let mut flat = Vec::with_capacity(decls.len());
        for decl in std::mem::take(decls) {
            flatten_into(decl, &mut flat);
        }
        *decls = flat;
    }
    unit
}

fn flatten_into(mut class: AstNode, out: &mut Vec<AstNode>) {
    let nested = match members_mut(&mut class) {
        Some(members) => {
            let (nested, kept): (Vec<AstNode>, Vec<AstNode>) =
                std::mem::take(members).into_iter().partition(|m| m.kind.class_name().is_some());
            *members = kept;
            nested
        }
        None => Vec::new(),
    };
    out.push(class);
    for n in nested {
        flatten_into(n, out);
    }
}
