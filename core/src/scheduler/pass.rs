//! file: core/src/scheduler/pass.rs
//! description: the side-effecting work attached to goals.
//!
//! A pass sees its job and the shared compiler state through `PassEnv`.
//! It either succeeds, fails fatally, or reports a dependency it found
//! missing so the scheduler can satisfy it and try again.

use std::collections::HashMap;
use std::path::PathBuf;

use log::{debug, warn};

use super::goal::{GoalKey, GoalKind, JobId};
use crate::desugar::DesugarPipeline;
use crate::dispatch::Lang;
use crate::error::{BoxedError, JavelinErrorExt};
use crate::frontend::{Frontend, FrontendError};
use crate::ir::lower::{LoweringError, translate_unit};
use crate::ir::{Emitter, output_path, verify_module};
use crate::job::Job;
use crate::options::Options;
use crate::types::TypeSystem;

#[derive(Debug)]
pub enum PassError {
    /// The pass needs `GoalKey` to have succeeded first.
    MissingDependency(GoalKey),
    Fatal(BoxedError),
}

impl<E: JavelinErrorExt + 'static> From<E> for PassError {
    fn from(err: E) -> Self {
        PassError::Fatal(Box::new(err))
    }
}

/// Borrowed view of the scheduler handed to a running pass.
pub struct PassEnv<'a> {
    pub job: &'a mut Job,
    pub ts: &'a mut dyn TypeSystem,
    pub lang: &'a Lang,
    pub options: &'a Options,
    pub frontend: &'a mut dyn Frontend,
    pub emitter: &'a mut dyn Emitter,
    /// Jobs indexed by the stem of their input file name.
    pub jobs_by_stem: &'a HashMap<String, JobId>,
}

pub trait Pass {
    fn name(&self) -> &str;
    fn run(&mut self, env: &mut PassEnv<'_>) -> Result<(), PassError>;
}

/// A pass built from a closure.
pub struct FnPass<F> {
    name: String,
    f: F,
}

impl<F> FnPass<F>
where
    F: FnMut(&mut PassEnv<'_>) -> Result<(), PassError>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        FnPass { name: name.into(), f }
    }
}

impl<F> Pass for FnPass<F>
where
    F: FnMut(&mut PassEnv<'_>) -> Result<(), PassError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, env: &mut PassEnv<'_>) -> Result<(), PassError> {
        (self.f)(env)
    }
}

fn missing_ast(job: &Job, stage: &str) -> PassError {
    FrontendError::internal(format!("{} has no AST at {}", job.name, stage)).into()
}

pub struct ParsePass;

impl Pass for ParsePass {
    fn name(&self) -> &str {
        "parse"
    }

    fn run(&mut self, env: &mut PassEnv<'_>) -> Result<(), PassError> {
        let ast = env.frontend.parse(env.job, env.ts)?;
        env.job.ast = Some(ast);
        Ok(())
    }
}

/// Type checks the unit. A class that only another job of this
/// compilation declares turns into a dependency on that job being parsed.
pub struct TypeCheckPass;

impl Pass for TypeCheckPass {
    fn name(&self) -> &str {
        "type-check"
    }

    fn run(&mut self, env: &mut PassEnv<'_>) -> Result<(), PassError> {
        let ast = env.job.ast.as_ref().ok_or_else(|| missing_ast(env.job, "type checking"))?;
        let err = match env.frontend.type_check(ast, &*env.ts) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        let provider = err
            .unresolved
            .as_deref()
            .and_then(|class| env.jobs_by_stem.get(class_stem(class)))
            .copied()
            .filter(|job| *job != env.job.id);
        match provider {
            Some(job) => {
                debug!("{} needs {} to be parsed first", env.job.name, job);
                Err(PassError::MissingDependency(GoalKey::new(job, GoalKind::Parsed)))
            }
            None => Err(err.into()),
        }
    }
}

/// Simple name of the top-level class enclosing `class`:
/// `pkg.Outer$Inner` -> `Outer`.
pub fn class_stem(class: &str) -> &str {
    let simple = class.rsplit('.').next().unwrap_or(class);
    simple.split('$').next().unwrap_or(simple)
}

pub struct SerializedPass;

impl Pass for SerializedPass {
    fn name(&self) -> &str {
        "serialize"
    }

    fn run(&mut self, _env: &mut PassEnv<'_>) -> Result<(), PassError> {
        Ok(())
    }
}

pub struct DesugarPass {
    pipeline: DesugarPipeline,
}

impl DesugarPass {
    pub fn new() -> Self {
        DesugarPass { pipeline: DesugarPipeline::new() }
    }
}

impl Default for DesugarPass {
    fn default() -> Self {
        DesugarPass::new()
    }
}

impl Pass for DesugarPass {
    fn name(&self) -> &str {
        "desugar"
    }

    fn run(&mut self, env: &mut PassEnv<'_>) -> Result<(), PassError> {
        self.pipeline.run(env.job, env.ts, env.lang)?;
        if env.options.dump_desugared {
            if let Some(ast) = &env.job.ast {
                eprintln!("// desugared {}\n{}", env.job.name, ast);
            }
        }
        Ok(())
    }
}

pub struct CodeGenPass;

impl Pass for CodeGenPass {
    fn name(&self) -> &str {
        "codegen"
    }

    fn run(&mut self, env: &mut PassEnv<'_>) -> Result<(), PassError> {
        let ast = env.job.ast.as_ref().ok_or_else(|| missing_ast(env.job, "codegen"))?;
        let module = translate_unit(ast, &env.job.name, env.lang, &*env.ts, env.options)?;
        env.job.module = Some(module);
        Ok(())
    }
}

pub struct EmitPass;

impl Pass for EmitPass {
    fn name(&self) -> &str {
        "emit"
    }

    fn run(&mut self, env: &mut PassEnv<'_>) -> Result<(), PassError> {
        let module = env
            .job
            .module
            .as_ref()
            .ok_or_else(|| PassError::from(LoweringError::internal(format!("{} has no module to emit", env.job.name))))?;
        verify_module(module)?;
        let source: PathBuf = env.job.source.clone().unwrap_or_else(|| env.job.input.clone());
        let path = output_path(&source, env.options);
        if module.functions.is_empty() {
            warn!("{} produced an empty module", env.job.name);
        }
        env.emitter.emit(module, &path)?;
        env.job.output = Some(path);
        Ok(())
    }
}
