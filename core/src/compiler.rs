//! file: core/src/compiler.rs
//! description: the default wiring of scheduler, front end and emitter.
//!
//! `Compiler` is what the driver talks to: it owns a `Scheduler` backed by
//! the bootstrap class table, the JSON front end and the text emitter, and
//! compiles jobs one at a time.

use std::path::{Path, PathBuf};

use glob::glob;
use log::{debug, warn};

use crate::frontend::{Frontend, FrontendError, JsonFrontend};
use crate::ir::{Emitter, TextEmitter};
use crate::options::Options;
use crate::scheduler::{GoalReport, JobId, Scheduler, SchedulerError};
use crate::types::{ClassTable, TypeSystem};

pub struct Compiler {
    scheduler: Scheduler,
}

impl Compiler {
    pub fn new(options: Options) -> Self {
        Compiler::with_parts(Box::new(ClassTable::bootstrap()), Box::new(JsonFrontend::new()), Box::new(TextEmitter), options)
    }

    pub fn with_parts(
        ts: Box<dyn TypeSystem>,
        frontend: Box<dyn Frontend>,
        emitter: Box<dyn Emitter>,
        options: Options,
    ) -> Self {
        Compiler { scheduler: Scheduler::new(ts, frontend, emitter, options) }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn add_input(&mut self, input: impl Into<PathBuf>) -> JobId {
        self.scheduler.add_job(input)
    }

    pub fn compile_job(&mut self, job: JobId) -> Result<PathBuf, SchedulerError> {
        self.scheduler.compile_job(job)
    }

    /// Compile every job added so far. A failing job does not stop the
    /// others; results come back in job order.
    pub fn compile_all(&mut self) -> Vec<(JobId, Result<PathBuf, SchedulerError>)> {
        let ids: Vec<JobId> = self.scheduler.jobs().iter().map(|j| j.id).collect();
        ids.into_iter()
            .map(|id| {
                let result = self.compile_job(id);
                if let Err(err) = &result {
                    debug!("{} failed: {}", id, err);
                }
                (id, result)
            })
            .collect()
    }

    pub fn report(&self) -> Vec<GoalReport> {
        self.scheduler.report()
    }
}

/// Expand input arguments that are glob patterns. Arguments naming an
/// existing file, or matching nothing, are kept as given.
pub fn expand_sources(patterns: &[String]) -> Result<Vec<PathBuf>, FrontendError> {
    let mut out = Vec::new();
    for pattern in patterns {
        if Path::new(pattern).exists() {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let paths = glob(pattern).map_err(|e| FrontendError::bad_pattern(pattern, &e))?;
        let before = out.len();
        for entry in paths {
            match entry {
                Ok(path) => out.push(path),
                Err(e) => warn!("skipping {}: {}", e.path().display(), e),
            }
        }
        if out.len() == before {
            out.push(PathBuf::from(pattern));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_pattern_is_kept_verbatim() {
        let out = expand_sources(&["no/such/dir/*.json".to_string()]).unwrap();
        assert_eq!(out, vec![PathBuf::from("no/such/dir/*.json")]);
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        assert!(expand_sources(&["a/[".to_string()]).is_err());
    }
}
