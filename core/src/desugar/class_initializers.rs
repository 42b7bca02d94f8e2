//! Moves field initializers and initializer blocks into code.
//!
//! Instance initializers run, in declaration order, right after the
//! superclass constructor call of every constructor that does not
//! delegate to `this(...)`. Static ones become the body of the synthetic
//! static method `$clinit`. Classes without a constructor get a default
//! one first, and constructors without an explicit head get `super()`.

use super::err::DesugarError;
use super::util::{ensure_clinit, insert_after_head, take};
use super::{Stage, StageContext};
use crate::ast::visit::rewrite_post_order;
use crate::ast::{AstNode, AstNodeKind, ClassKind, CtorCallKind, Flags, build};
use crate::types::OBJECT_CLASS;

pub struct DesugarClassInitializers;

impl Stage for DesugarClassInitializers {
    fn name(&self) -> &'static str {
        "desugar-class-initializers"
    }

    fn run(&self, unit: AstNode, _cx: &StageContext<'_>) -> Result<AstNode, DesugarError> {
        rewrite_post_order(unit, &mut |node: AstNode| {
            if matches!(node.kind, AstNodeKind::ClassDecl { .. }) {
                Ok(desugar_class(node))
            } else {
                Ok(node)
            }
        })
    }
}

fn desugar_class(mut class: AstNode) -> AstNode {
    let AstNodeKind::ClassDecl { name, class_kind, superclass, members, .. } = &mut class.kind else {
        return class;
    };
    let mut instance_init = Vec::new();
    let mut static_init = Vec::new();
    let mut kept = Vec::with_capacity(members.len());

    for mut member in std::mem::take(members) {
        match &mut member.kind {
            AstNodeKind::FieldDecl { name: field, flags, field_ty, init } => {
                if let Some(value) = init.take() {
                    let (target, out) = if flags.is_static {
                        (build::static_field(name, field, field_ty.clone()), &mut static_init)
                    } else {
                        (build::field(build::this_ref(name), name, field, field_ty.clone()), &mut instance_init)
                    };
                    out.push(build::expr_stmt(build::assign(target, *value)));
                }
                kept.push(member);
            }
            AstNodeKind::Initializer { is_static, body } => {
                let body = take(body);
                if *is_static {
                    static_init.push(body);
                } else {
                    instance_init.push(body);
                }
            }
            _ => kept.push(member),
        }
    }

    let has_ctor = kept.iter().any(|m| matches!(m.kind, AstNodeKind::ConstructorDecl { .. }));
    if !has_ctor && *class_kind != ClassKind::Interface {
        let flags = Flags { is_public: true, is_synthetic: true, ..Flags::none() };
        kept.insert(0, build::ctor_decl(flags, vec![], build::block(vec![])));
    }

    let super_owner = superclass.clone().unwrap_or_else(|| OBJECT_CLASS.to_string());
    let is_root = name.as_str() == OBJECT_CLASS;
    for member in &mut kept {
        if let AstNodeKind::ConstructorDecl { body, .. } = &mut member.kind {
            match build::ctor_head(body) {
                Some(CtorCallKind::This) => continue,
                Some(CtorCallKind::Super) => {}
                None if is_root => {}
                None => {
                    let implicit = build::ctor_call(CtorCallKind::Super, &super_owner, vec![], vec![]);
                    **body = insert_at_start(take(body), implicit);
                }
            }
            let inits = instance_init.iter().map(AstNode::fresh_copy).collect();
            **body = insert_after_head(take(body), inits);
        }
    }

    if !static_init.is_empty() {
        let clinit = ensure_clinit(&mut kept);
        if let AstNodeKind::MethodDecl { body: Some(body), .. } = &mut clinit.kind {
            if let AstNodeKind::Block { statements } = &mut body.kind {
                statements.extend(static_init);
            }
        }
    }
    *members = kept;
    class
}

fn insert_at_start(mut body: AstNode, stmt: AstNode) -> AstNode {
    match &mut body.kind {
        AstNodeKind::Block { statements } => {
            statements.insert(0, stmt);
            body
        }
        _ => build::block(vec![stmt, body]),
    }
}
