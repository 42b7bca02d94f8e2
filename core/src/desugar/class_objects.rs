use super::err::DesugarError;
use super::{Stage, StageContext};
use crate::ast::{AstNode, AstNodeKind, Flags, build};
use crate::types::{CLASS_CLASS, Type};

pub const CLASS_OBJECT_FIELD: &str = "class$";

/// Gives every top-level class a static `class$` field for its runtime
/// class object.
pub struct DeclareClassObjects;

impl Stage for DeclareClassObjects {
    fn name(&self) -> &'static str {
        "declare-class-objects"
    }

    fn run(&self, mut unit: AstNode, _cx: &StageContext<'_>) -> Result<AstNode, DesugarError> {
        let AstNodeKind::CompilationUnit { decls, .. } = &mut unit.kind else {
            return Ok(unit);
        };
        for decl in decls.iter_mut() {
            let AstNodeKind::ClassDecl { members, .. } = &mut decl.kind else {
                continue;
            };
            let declared = members
                .iter()
                .any(|m| matches!(&m.kind, AstNodeKind::FieldDecl { name, .. } if name == CLASS_OBJECT_FIELD));
            if !declared {
                let flags = Flags { is_static: true, ..Flags::synthetic_final() };
                members.push(build::field_decl(CLASS_OBJECT_FIELD, flags, Type::class(CLASS_CLASS), None));
            }
        }
        Ok(unit)
    }
}
