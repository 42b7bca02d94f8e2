//! Lowers enum declarations to final classes extending `java.lang.Enum`.
//!
//! Constructors take the constant's name and ordinal as two leading
//! parameters and hand them to `Enum(String, int)`. Each constant becomes
//! a `public static final` field assigned at the start of `$clinit`, and
//! the synthetic `$VALUES` array lists them in declaration order.

use super::err::DesugarError;
use super::util::{ensure_clinit, head_call_mut, take};
use super::{Stage, StageContext};
use crate::ast::visit::rewrite_post_order;
use crate::ast::{AstNode, AstNodeKind, ClassKind, CtorCallKind, Flags, Param, build};
use crate::types::{ENUM_CLASS, Type};

pub const NAME_PARAM: &str = "$name";
pub const ORDINAL_PARAM: &str = "$ordinal";
pub const VALUES_FIELD: &str = "$VALUES";

pub struct DesugarEnums;

impl Stage for DesugarEnums {
    fn name(&self) -> &'static str {
        "desugar-enums"
    }

    fn run(&self, unit: AstNode, _cx: &StageContext<'_>) -> Result<AstNode, DesugarError> {
        rewrite_post_order(unit, &mut |node: AstNode| {
            if matches!(node.kind, AstNodeKind::ClassDecl { class_kind: ClassKind::Enum, .. }) {
                desugar_enum(node)
            } else {
                Ok(node)
            }
        })
    }
}

fn enum_params() -> Vec<Type> {
    vec![Type::string(), Type::int()]
}

fn desugar_enum(mut class: AstNode) -> Result<AstNode, DesugarError> {
    let location = class.location.clone();
    let AstNodeKind::ClassDecl { name, class_kind, flags, superclass, members, .. } = &mut class.kind else {
        return Err(DesugarError::internal("expected an enum declaration"));
    };
    *class_kind = ClassKind::Class;
    flags.is_final = true;
    // Nested enums are implicitly static.
    flags.is_static = true;
    *superclass = Some(ENUM_CLASS.to_string());
    let enum_ty = Type::class(name.as_str());

    let mut constants = Vec::new();
    let mut kept = Vec::with_capacity(members.len());
    for member in std::mem::take(members) {
        match member.kind {
            AstNodeKind::EnumConstant { name, ctor_params, args } => constants.push((name, ctor_params, args)),
            _ => kept.push(member),
        }
    }

    for member in &mut kept {
        if let AstNodeKind::ConstructorDecl { params, body, .. } = &mut member.kind {
            params.splice(0..0, [Param::new(NAME_PARAM, Type::string()), Param::new(ORDINAL_PARAM, Type::int())]);
            forward_name_and_ordinal(body).map_err(|e| e.at(location.as_ref()))?;
        }
    }

    let const_flags = Flags { is_public: true, is_static: true, is_final: true, is_synthetic: false };
    let mut inits = Vec::with_capacity(constants.len() + 1);
    let mut values = Vec::with_capacity(constants.len());
    for (ordinal, (constant, ctor_params, args)) in constants.into_iter().enumerate() {
        let ordinal = i32::try_from(ordinal).map_err(|_| DesugarError::internal("too many enum constants"))?;
        let mut call_params = enum_params();
        call_params.extend(ctor_params);
        let mut call_args = vec![build::string_lit(&constant), build::int_lit(ordinal)];
        call_args.extend(args);

        let target = build::static_field(name, &constant, enum_ty.clone());
        let created = build::new_object(name, call_params, call_args);
        inits.push(build::expr_stmt(build::assign(target, created)));
        values.push(build::static_field(name, &constant, enum_ty.clone()));
        kept.push(build::field_decl(&constant, const_flags, enum_ty.clone(), None));
    }

    let values_ty = Type::array_of(enum_ty.clone());
    let values_flags = Flags { is_static: true, ..Flags::synthetic_final() };
    kept.push(build::field_decl(VALUES_FIELD, values_flags, values_ty.clone(), None));
    let values_target = build::static_field(name, VALUES_FIELD, values_ty);
    inits.push(build::expr_stmt(build::assign(values_target, build::array_init(enum_ty, values))));

    let clinit = ensure_clinit(&mut kept);
    if let AstNodeKind::MethodDecl { body: Some(body), .. } = &mut clinit.kind {
        if let AstNodeKind::Block { statements } = &mut body.kind {
            statements.splice(0..0, inits);
        }
    }
    *members = kept;
    Ok(class)
}

/// Point the constructor head at `Enum(String, int)`, or thread the two
/// values through a `this(...)` delegation.
fn forward_name_and_ordinal(body: &mut AstNode) -> Result<(), DesugarError> {
    let name = || build::local(NAME_PARAM, Type::string());
    let ordinal = || build::local(ORDINAL_PARAM, Type::int());

    let Some(head) = head_call_mut(body) else {
        let call = build::ctor_call(CtorCallKind::Super, ENUM_CLASS, enum_params(), vec![name(), ordinal()]);
        let rest = take(body);
        *body = build::block(vec![call, rest]);
        return Ok(());
    };
    match &mut head.kind {
        AstNodeKind::ConstructorCall { call_kind: CtorCallKind::This, params, args, .. } => {
            params.splice(0..0, enum_params());
            args.splice(0..0, [name(), ordinal()]);
        }
        _ => {
            *head = build::ctor_call(CtorCallKind::Super, ENUM_CLASS, enum_params(), vec![name(), ordinal()]);
        }
    }
    Ok(())
}
