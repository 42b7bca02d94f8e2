use super::err::DesugarError;
use super::{Stage, StageContext};
use crate::ast::visit::rewrite_post_order;
use crate::ast::{AstNode, AstNodeKind, CtorCallKind, Flags, Param, build};
use crate::types::{OBJECT_CLASS, Type};

/// Gives every anonymous class a constructor taking the arguments of its
/// `new` expression and passing them on to the superclass constructor.
pub struct DeclareExplicitAnonCtors;

impl Stage for DeclareExplicitAnonCtors {
    fn name(&self) -> &'static str {
        "declare-anonymous-constructors"
    }

    fn run(&self, unit: AstNode, _cx: &StageContext<'_>) -> Result<AstNode, DesugarError> {
        rewrite_post_order(unit, &mut |mut node: AstNode| {
            if let AstNodeKind::New { ctor_params, body: Some(body), .. } = &mut node.kind {
                declare_ctor(body, ctor_params);
            }
            Ok(node)
        })
    }
}

fn declare_ctor(class: &mut AstNode, ctor_params: &[Type]) {
    let AstNodeKind::ClassDecl { superclass, members, .. } = &mut class.kind else {
        return;
    };
    if members.iter().any(|m| matches!(m.kind, AstNodeKind::ConstructorDecl { .. })) {
        return;
    }
    let params: Vec<Param> =
        ctor_params.iter().enumerate().map(|(i, ty)| Param::new(format!("arg${}", i), ty.clone())).collect();
    let args = params.iter().map(|p| build::local(&p.name, p.ty.clone())).collect();
    let owner = superclass.as_deref().unwrap_or(OBJECT_CLASS);
    let body = build::block(vec![build::ctor_call(CtorCallKind::Super, owner, ctor_params.to_vec(), args)]);
    let flags = Flags { is_synthetic: true, ..Flags::none() };
    members.insert(0, build::ctor_decl(flags, params, body));
}
