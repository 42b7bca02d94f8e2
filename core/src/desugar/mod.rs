//! file: core/src/desugar/mod.rs
//! description: the fixed sequence of tree rewrites between type checking
//! and code generation.
//!
//! The pipeline removes nested, local and anonymous classes, enums and
//! initializers so that code generation only sees flat classes with
//! explicit constructors. It rewrites the tree in place and cannot be
//! rolled back, so every library class it may need is looked up before
//! the first stage runs, and it refuses to run twice on the same job.

pub mod anon_ctors;
pub mod class_initializers;
pub mod class_objects;
pub mod enums;
pub mod err;
pub mod inner_classes;
pub mod local_classes;
pub mod name_local_classes;
pub mod util;

pub use err::DesugarError;

use std::collections::HashSet;

use log::{debug, info};

use crate::ast::{AstNode, AstNodeKind};
use crate::dispatch::Lang;
use crate::frontend::declare_unit_classes;
use crate::job::Job;
use crate::types::TypeSystem;

/// Library classes the stages may reference.
pub const REQUIRED_TYPES: &[&str] = &[
    "java.lang.Class",
    "java.lang.ClassCastException",
    "java.lang.NullPointerException",
    "java.lang.IndexOutOfBoundsException",
    "java.lang.ArrayIndexOutOfBoundsException",
    "java.lang.AssertionError",
    "java.lang.Throwable",
    "java.lang.Exception",
    "java.lang.Error",
    "support.Array",
    "support.Array$Type",
    "support.Helper",
];

pub struct StageContext<'a> {
    pub ts: &'a dyn TypeSystem,
    pub lang: &'a Lang,
}

/// One rewrite of a whole compilation unit.
pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, unit: AstNode, cx: &StageContext<'_>) -> Result<AstNode, DesugarError>;
}

/// Node-local rewrites supplied by the language's extension objects.
pub struct DesugarLocally;

impl Stage for DesugarLocally {
    fn name(&self) -> &'static str {
        "desugar-locally"
    }

    fn run(&self, unit: AstNode, cx: &StageContext<'_>) -> Result<AstNode, DesugarError> {
        Ok(cx.lang.desugar_locally(unit))
    }
}

pub struct DesugarPipeline {
    attempted: HashSet<String>,
    stages: Vec<Box<dyn Stage>>,
}

impl Default for DesugarPipeline {
    fn default() -> Self {
        DesugarPipeline::new()
    }
}

impl DesugarPipeline {
    pub fn new() -> Self {
        DesugarPipeline {
            attempted: HashSet::new(),
            stages: vec![
                Box::new(name_local_classes::NameLocalClasses),
                Box::new(anon_ctors::DeclareExplicitAnonCtors),
                Box::new(class_initializers::DesugarClassInitializers),
                Box::new(enums::DesugarEnums),
                Box::new(local_classes::DesugarLocalClasses),
                Box::new(inner_classes::DesugarInnerClasses),
                Box::new(class_objects::DeclareClassObjects),
                Box::new(DesugarLocally),
            ],
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn has_run(&self, job: &str) -> bool {
        self.attempted.contains(job)
    }

    /// Desugar `job.ast` and redeclare its classes in `ts`.
    ///
    /// Fails without touching the job if a required library class is
    /// missing, or if this pipeline already ran on the job.
    pub fn run(&mut self, job: &mut Job, ts: &mut dyn TypeSystem, lang: &Lang) -> Result<(), DesugarError> {
        for name in REQUIRED_TYPES {
            ts.type_for_name(name).map_err(|e| DesugarError::missing_library_type(name, &e))?;
            ts.members(name).map_err(|e| DesugarError::missing_library_type(name, &e))?;
        }

        if !self.attempted.insert(job.name.clone()) {
            return Err(DesugarError::rerun(&job.name));
        }

        let ast = job
            .ast
            .take()
            .ok_or_else(|| DesugarError::internal(format!("job '{}' has no tree to desugar", job.name)))?;
        let mut unit = match ast.kind {
            AstNodeKind::CompilationUnit { .. } => ast,
            _ => AstNode::synthetic(AstNodeKind::CompilationUnit { package: None, decls: vec![ast] }),
        };

        let cx = StageContext { ts: &*ts, lang };
        for stage in &self.stages {
            debug!("{}: {}", job.name, stage.name());
            unit = stage.run(unit, &cx)?;
        }
        declare_unit_classes(&unit, ts);
        info!("desugared {}", job.name);
        job.ast = Some(unit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_run_in_fixed_order() {
        let pipeline = DesugarPipeline::new();
        assert_eq!(
            pipeline.stage_names(),
            vec![
                "name-local-classes",
                "declare-anonymous-constructors",
                "desugar-class-initializers",
                "desugar-enums",
                "desugar-local-classes",
                "desugar-inner-classes",
                "declare-class-objects",
                "desugar-locally",
            ]
        );
    }
}
