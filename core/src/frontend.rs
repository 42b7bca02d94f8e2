//! file: core/src/frontend.rs
//! description: the boundary to the external parser and type checker.
//!
//! The back end never reads source text. A `Frontend` hands it a fully
//! typed AST per job and populates the type system with the classes that
//! AST can see. `JsonFrontend` reads serialized compilation units written
//! by an external front end; `MemoryFrontend` serves units built in code.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::ast::visit::walk;
use crate::ast::{AstNode, AstNodeKind, ClassKind};
use crate::error::{ErrorCode, Level, impl_error_ext};
use crate::job::Job;
use crate::location::Location;
use crate::types::{ClassInfo, ENUM_CLASS, FieldInfo, MethodInfo, OBJECT_CLASS, Type, TypeSystem};

#[derive(Debug, Clone)]
pub struct FrontendError {
    level: Level,
    code: ErrorCode,
    message: String,
    issuer: &'static str,
    location: Option<Location>,
    /// Class whose lookup failed, for errors another job may resolve.
    pub unresolved: Option<String>,
}

impl FrontendError {
    fn new(message: String, location: Option<Location>) -> Self {
        FrontendError {
            level: Level::Error,
            code: ErrorCode::Frontend,
            message,
            issuer: "javelin.frontend",
            location,
            unresolved: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        let mut err = FrontendError::new(message.into(), None);
        err.level = Level::Critical;
        err.code = ErrorCode::Internal;
        err
    }

    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        let mut err = FrontendError::new(format!("cannot read '{}': {}", path.display(), err), None);
        err.code = ErrorCode::Io;
        err
    }

    pub fn malformed(path: &Path, err: &serde_json::Error) -> Self {
        FrontendError::new(format!("'{}' is not a compilation unit: {}", path.display(), err), None)
    }

    pub fn bad_pattern(pattern: &str, err: &glob::PatternError) -> Self {
        FrontendError::new(format!("invalid input pattern '{}': {}", pattern, err), None)
    }

    pub fn untyped(node: &AstNode) -> Self {
        FrontendError::new(format!("{} expression has no resolved type", node.kind.tag()), node.location.clone())
    }

    pub fn unresolved(class: &str, node: &AstNode) -> Self {
        let mut err = FrontendError::new(format!("cannot resolve class '{}'", class), node.location.clone());
        err.unresolved = Some(class.to_string());
        err
    }
}

impl_error_ext!(FrontendError);

/// Serialized form of one type-checked compilation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationUnitFile {
    /// The source file the unit was produced from.
    #[serde(default)]
    pub source: Option<PathBuf>,
    /// Library classes visible to the unit.
    #[serde(default)]
    pub classes: Vec<ClassInfo>,
    pub ast: AstNode,
}

pub trait Frontend {
    /// Produce the typed AST of `job`, declaring every class it can see
    /// into `ts`.
    fn parse(&mut self, job: &mut Job, ts: &mut dyn TypeSystem) -> Result<AstNode, FrontendError>;

    /// Check that every expression carries a type and every class the
    /// tree mentions resolves.
    fn type_check(&mut self, ast: &AstNode, ts: &dyn TypeSystem) -> Result<(), FrontendError> {
        check_resolved(ast, ts)
    }
}

fn type_class(ty: &Type) -> Option<&str> {
    match ty {
        Type::Class(name) => Some(name),
        Type::Array(elem) => type_class(elem),
        _ => None,
    }
}

/// Class names a single node refers to, excluding those of its children.
fn referenced_classes(node: &AstNode) -> Vec<&str> {
    let mut out: Vec<&str> = node.ty().and_then(type_class).into_iter().collect();
    match &node.kind {
        AstNodeKind::ClassDecl { superclass, interfaces, .. } => {
            out.extend(superclass.as_deref());
            out.extend(interfaces.iter().map(String::as_str));
        }
        AstNodeKind::New { class, .. } => out.push(class),
        AstNodeKind::Field { owner, .. }
        | AstNodeKind::Call { owner, .. }
        | AstNodeKind::ConstructorCall { owner, .. } => out.push(owner),
        AstNodeKind::Cast { target, .. } => out.extend(type_class(target)),
        _ => {}
    }
    out.retain(|name| !name.is_empty());
    out
}

pub fn check_resolved(ast: &AstNode, ts: &dyn TypeSystem) -> Result<(), FrontendError> {
    let mut first_error = None;
    walk(ast, &mut |node| {
        if first_error.is_some() {
            return;
        }
        if node.kind.is_expression() && node.ty().is_none() {
            first_error = Some(FrontendError::untyped(node));
            return;
        }
        if let Some(class) = referenced_classes(node).into_iter().find(|c| ts.type_for_name(c).is_err()) {
            first_error = Some(FrontendError::unresolved(class, node));
        }
    });
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Declare every named class of `ast` (member and local classes included)
/// into `ts`, replacing earlier declarations of the same name.
pub fn declare_unit_classes(ast: &AstNode, ts: &mut dyn TypeSystem) {
    let mut infos = Vec::new();
    walk(ast, &mut |node| {
        if let AstNodeKind::ClassDecl { name, class_kind, superclass, interfaces, members, .. } = &node.kind {
            if !name.is_empty() {
                infos.push(class_info(name, *class_kind, superclass.as_deref(), interfaces, members));
            }
        }
    });
    for info in infos {
        debug!("declaring unit class {}", info.name);
        ts.declare_class(info);
    }
}

fn class_info(
    name: &str,
    class_kind: ClassKind,
    superclass: Option<&str>,
    interfaces: &[String],
    members: &[AstNode],
) -> ClassInfo {
    let superclass = match (superclass, class_kind) {
        (Some(sup), _) => Some(sup),
        _ if name == OBJECT_CLASS => None,
        (None, ClassKind::Enum) => Some(ENUM_CLASS),
        (None, _) => Some(OBJECT_CLASS),
    };
    let mut info = ClassInfo::new(name, superclass);
    info.interfaces = interfaces.to_vec();
    info.is_interface = class_kind == ClassKind::Interface;
    for member in members {
        match &member.kind {
            AstNodeKind::FieldDecl { name, flags, field_ty, .. } => info.fields.push(FieldInfo {
                name: name.clone(),
                ty: field_ty.clone(),
                is_static: flags.is_static,
            }),
            AstNodeKind::MethodDecl { name, flags, params, ret, .. } => info.methods.push(MethodInfo {
                name: name.clone(),
                params: params.iter().map(|p| p.ty.clone()).collect(),
                ret: ret.clone(),
                is_static: flags.is_static,
            }),
            AstNodeKind::ConstructorDecl { params, .. } => info.methods.push(MethodInfo {
                name: "<init>".to_string(),
                params: params.iter().map(|p| p.ty.clone()).collect(),
                ret: Type::Void,
                is_static: false,
            }),
            _ => {}
        }
    }
    info
}

fn load_unit(unit: CompilationUnitFile, job: &mut Job, ts: &mut dyn TypeSystem) -> AstNode {
    for class in unit.classes {
        ts.declare_class(class);
    }
    declare_unit_classes(&unit.ast, ts);
    job.source = unit.source;
    unit.ast
}

/// Reads `CompilationUnitFile` JSON from each job's input path.
#[derive(Debug, Default)]
pub struct JsonFrontend;

impl JsonFrontend {
    pub fn new() -> Self {
        JsonFrontend
    }
}

impl Frontend for JsonFrontend {
    fn parse(&mut self, job: &mut Job, ts: &mut dyn TypeSystem) -> Result<AstNode, FrontendError> {
        let text = std::fs::read_to_string(&job.input).map_err(|e| FrontendError::io(&job.input, &e))?;
        let unit: CompilationUnitFile =
            serde_json::from_str(&text).map_err(|e| FrontendError::malformed(&job.input, &e))?;
        debug!("loaded {} ({} library classes)", job.input.display(), unit.classes.len());
        Ok(load_unit(unit, job, ts))
    }
}

/// Serves prebuilt units keyed by input path.
#[derive(Debug, Default)]
pub struct MemoryFrontend {
    units: HashMap<PathBuf, CompilationUnitFile>,
}

impl MemoryFrontend {
    pub fn new() -> Self {
        MemoryFrontend::default()
    }

    pub fn add_unit(&mut self, input: impl Into<PathBuf>, unit: CompilationUnitFile) {
        self.units.insert(input.into(), unit);
    }
}

impl Frontend for MemoryFrontend {
    fn parse(&mut self, job: &mut Job, ts: &mut dyn TypeSystem) -> Result<AstNode, FrontendError> {
        let unit = self.units.get(&job.input).ok_or_else(|| {
            FrontendError::io(&job.input, &std::io::Error::from(std::io::ErrorKind::NotFound))
        })?;
        let unit = CompilationUnitFile { ast: unit.ast.fresh_copy(), ..unit.clone() };
        Ok(load_unit(unit, job, ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build;
    use crate::types::ClassTable;

    #[test]
    fn untyped_expression_fails_type_check() {
        let ts = ClassTable::bootstrap();
        let untyped = AstNode::synthetic(AstNodeKind::IntLit { value: 1 });
        let err = check_resolved(&build::expr_stmt(untyped), &ts).unwrap_err();
        assert!(err.unresolved.is_none());
    }

    #[test]
    fn unknown_class_is_reported_by_name() {
        let ts = ClassTable::bootstrap();
        let expr = build::new_object("demo.Missing", vec![], vec![]);
        let err = check_resolved(&build::expr_stmt(expr), &ts).unwrap_err();
        assert_eq!(err.unresolved.as_deref(), Some("demo.Missing"));
    }

    #[test]
    fn unit_classes_default_to_object_superclass() {
        let mut ts = ClassTable::bootstrap();
        let unit = build::class_decl("demo.A", ClassKind::Class, Default::default(), None, vec![]);
        declare_unit_classes(&unit, &mut ts);
        let info = ts.type_for_name("demo.A").unwrap();
        assert_eq!(info.superclass.as_deref(), Some(OBJECT_CLASS));
    }
}
