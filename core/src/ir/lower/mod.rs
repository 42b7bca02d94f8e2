//! file: core/src/ir/lower/mod.rs
//! description: AST -> IR translation entry points.
//!
//! `translate_unit` lowers one desugared compilation unit into an
//! `IrModule`: class layouts and static globals are declared up front, then
//! the dispatch layer walks the tree, and finally the optional entry-point
//! `main` shim is appended.

pub mod context;
pub mod err;
pub mod function_builder;
pub mod tables;

use log::debug;

pub use self::context::{LocalSlot, TranslationContext};
pub use self::err::LoweringError;
pub use self::function_builder::FunctionBuilder;

use crate::ast::{AstNode, AstNodeKind};
use crate::dispatch::Lang;
use crate::ir::module::{ClassLayout, Global, IrModule};
use crate::ir::op::{Instr, Terminator};
use crate::ir::value::{IrType, Operand};
use crate::options::Options;
use crate::types::{Type, TypeSystem};

pub const CLASS_INIT: &str = "$clinit";
pub const CONSTRUCTOR: &str = "<init>";

/// Symbol of the function implementing `owner.name(params)`.
pub fn function_name(owner: &str, name: &str, params: &[Type]) -> String {
    let params = params.iter().map(Type::to_string).collect::<Vec<_>>().join(",");
    format!("{}.{}({})", owner, name, params)
}

pub fn global_name(owner: &str, field: &str) -> String {
    format!("{}.{}", owner, field)
}

pub fn zero_value(ty: IrType) -> Operand {
    match ty {
        IrType::F32 | IrType::F64 => Operand::ConstFloat { ty, value: 0.0 },
        IrType::Ptr | IrType::Void => Operand::Null,
        int => Operand::int(int, 0),
    }
}

pub fn translate_unit(
    unit: &AstNode,
    name: &str,
    lang: &Lang,
    ts: &dyn TypeSystem,
    options: &Options,
) -> Result<IrModule, LoweringError> {
    let mut ctx = TranslationContext::new(name, ts);
    declare_classes(unit, &mut ctx)?;
    lang.translate(unit, &mut ctx)?;
    if let Some(entry) = &options.entry_point {
        emit_entry_point(&mut ctx, entry)?;
    }
    let module = ctx.into_module();
    debug!(
        "translated '{}': {} classes, {} globals, {} functions",
        module.name,
        module.classes.len(),
        module.globals.len(),
        module.functions.len()
    );
    Ok(module)
}

/// Declare a layout for every top-level class of the unit, superclasses
/// before subclasses, and a global for every static field.
fn declare_classes(unit: &AstNode, ctx: &mut TranslationContext<'_>) -> Result<(), LoweringError> {
    let decls: Vec<&AstNode> = match &unit.kind {
        AstNodeKind::CompilationUnit { decls, .. } => decls.iter().collect(),
        _ => vec![unit],
    };
    let mut pending: Vec<&AstNode> = decls.into_iter().filter(|d| d.kind.class_name().is_some()).collect();

    while !pending.is_empty() {
        let before = pending.len();
        let mut deferred = Vec::new();
        for decl in pending {
            let AstNodeKind::ClassDecl { name, superclass, members, .. } = &decl.kind else {
                continue;
            };
            let waits_on_unit_class = superclass.as_deref().is_some_and(|sup| {
                ctx.module.class(sup).is_none() && unit_declares(unit, sup)
            });
            if waits_on_unit_class {
                deferred.push(decl);
                continue;
            }

            let mut fields = match superclass {
                Some(sup) => inherited_fields(ctx, sup)?,
                None => Vec::new(),
            };
            for member in members {
                if let AstNodeKind::FieldDecl { name: field, flags, field_ty, .. } = &member.kind {
                    let ty = tables::ir_type(field_ty);
                    if flags.is_static {
                        ctx.module.add_global(Global { name: global_name(name, field), ty, init: zero_value(ty) });
                    } else {
                        fields.push((field.clone(), ty));
                    }
                }
            }
            ctx.module.classes.push(ClassLayout { name: name.clone(), superclass: superclass.clone(), fields });
        }
        if deferred.len() == before {
            let names: Vec<_> = deferred.iter().filter_map(|d| d.kind.class_name()).collect();
            return Err(LoweringError::internal(format!("circular superclass chain among {:?}", names)));
        }
        pending = deferred;
    }
    Ok(())
}

fn unit_declares(unit: &AstNode, class: &str) -> bool {
    match &unit.kind {
        AstNodeKind::CompilationUnit { decls, .. } => decls.iter().any(|d| d.kind.class_name() == Some(class)),
        _ => false,
    }
}

/// Instance fields of `class` and its supertypes, root class first.
fn inherited_fields(ctx: &TranslationContext<'_>, class: &str) -> Result<Vec<(String, IrType)>, LoweringError> {
    if let Some(layout) = ctx.module.class(class) {
        return Ok(layout.fields.clone());
    }
    let info = ctx
        .ts
        .type_for_name(class)
        .map_err(|e| LoweringError::internal(e.to_string()))?;
    let mut fields = match &info.superclass {
        Some(sup) => inherited_fields(ctx, sup)?,
        None => Vec::new(),
    };
    fields.extend(
        info.fields
            .iter()
            .filter(|f| !f.is_static)
            .map(|f| (f.name.clone(), tables::ir_type(&f.ty))),
    );
    Ok(fields)
}

/// `i32 main()`: run every class initializer of the module, then call
/// `entry.main(String[])` with a null argument array.
fn emit_entry_point(ctx: &mut TranslationContext<'_>, entry: &str) -> Result<(), LoweringError> {
    let target = function_name(entry, "main", &[Type::array_of(Type::string())]);
    if ctx.module.function(&target).is_none() {
        debug!("entry point {} is not defined in module '{}'", target, ctx.module.name);
        return Ok(());
    }
    let clinit_suffix = format!(".{}()", CLASS_INIT);
    let initializers: Vec<String> = ctx
        .module
        .functions
        .iter()
        .filter(|f| f.name.ends_with(&clinit_suffix))
        .map(|f| f.name.clone())
        .collect();

    ctx.begin_function("main", vec![], IrType::I32, false)?;
    for callee in initializers {
        ctx.emit(Instr::Call { dest: None, ret: IrType::Void, callee, args: vec![] })?;
    }
    ctx.emit(Instr::Call { dest: None, ret: IrType::Void, callee: target, args: vec![(IrType::Ptr, Operand::Null)] })?;
    ctx.terminate(Terminator::Ret { value: Some((IrType::I32, Operand::int(IrType::I32, 0))) })?;
    ctx.end_function()
}
