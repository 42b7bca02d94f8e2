//! file: core/src/scheduler/mod.rs
//! description: demand-driven, memoized goal scheduler.
//!
//! Goals live in an arena and are interned by `GoalKey`, so asking twice
//! for the same work on the same job yields the same goal and shared
//! prerequisites run once. `run` executes prerequisites depth first in
//! declaration order, then the goal's pass. Passes that discover a missing
//! dependency get it resolved, linked in and run before being retried.

pub mod err;
pub mod goal;
pub mod pass;

use std::collections::HashMap;
use std::path::PathBuf;

use log::{debug, trace};

pub use err::SchedulerError;
pub use goal::{Goal, GoalId, GoalKey, GoalKind, GoalReport, GoalStatus, JobId};
pub use pass::{
    CodeGenPass, DesugarPass, EmitPass, FnPass, ParsePass, Pass, PassEnv, PassError, SerializedPass, TypeCheckPass,
};

use crate::dispatch::Lang;
use crate::error::{ErrorCode, JavelinErrorExt};
use crate::frontend::Frontend;
use crate::ir::Emitter;
use crate::job::Job;
use crate::options::Options;
use crate::types::TypeSystem;

/// Upper bound on pass invocations per goal; a pass that keeps reporting
/// new dependencies past this is treated as livelocked.
pub const MAX_PASS_ATTEMPTS: usize = 16;

#[derive(PartialEq, Eq, Clone, Copy)]
enum VisitState {
    Unseen,
    Visiting,
    Done,
}

pub struct Scheduler {
    goals: Vec<Goal>,
    interned: HashMap<GoalKey, GoalId>,
    jobs: Vec<Job>,
    jobs_by_stem: HashMap<String, JobId>,
    ts: Box<dyn TypeSystem>,
    lang: Lang,
    options: Options,
    frontend: Box<dyn Frontend>,
    emitter: Box<dyn Emitter>,
}

impl Scheduler {
    pub fn new(
        ts: Box<dyn TypeSystem>,
        frontend: Box<dyn Frontend>,
        emitter: Box<dyn Emitter>,
        options: Options,
    ) -> Self {
        Scheduler {
            goals: Vec::new(),
            interned: HashMap::new(),
            jobs: Vec::new(),
            jobs_by_stem: HashMap::new(),
            ts,
            lang: Lang::new(),
            options,
            frontend,
            emitter,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn lang_mut(&mut self) -> &mut Lang {
        &mut self.lang
    }

    pub fn type_system(&self) -> &dyn TypeSystem {
        self.ts.as_ref()
    }

    pub fn add_job(&mut self, input: impl Into<PathBuf>) -> JobId {
        let id = JobId(self.jobs.len());
        let job = Job::new(id, input.into());
        debug!("added {} for {}", id, job.input.display());
        self.jobs_by_stem.entry(job.name.clone()).or_insert(id);
        self.jobs.push(job);
        id
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(id.0)
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn goal(&self, id: GoalId) -> Option<&Goal> {
        self.goals.get(id.0)
    }

    pub fn status(&self, id: GoalId) -> Option<GoalStatus> {
        self.goal(id).map(|g| g.status)
    }

    fn check_goal(&self, id: GoalId) -> Result<(), SchedulerError> {
        match self.goals.get(id.0) {
            Some(_) => Ok(()),
            None => Err(SchedulerError::unknown_goal_id(id)),
        }
    }

    pub fn lookup(&self, key: &GoalKey) -> Option<GoalId> {
        self.interned.get(key).copied()
    }

    /// Intern a goal. An existing goal with the same key is returned
    /// unchanged and `pass` is dropped.
    pub fn intern_goal(
        &mut self,
        key: GoalKey,
        prerequisites: Vec<GoalId>,
        pass: Box<dyn Pass>,
        idempotent: bool,
    ) -> Result<GoalId, SchedulerError> {
        if let Some(id) = self.lookup(&key) {
            return Ok(id);
        }
        if self.job(key.job).is_none() {
            return Err(SchedulerError::unknown_job(&key));
        }
        let id = GoalId(self.goals.len());
        trace!("interned goal {} ({})", key, pass.name());
        self.goals.push(Goal::new(key.clone(), pass, idempotent));
        self.interned.insert(key, id);
        for prereq in prerequisites {
            self.add_prerequisite(id, prereq)?;
        }
        Ok(id)
    }

    /// The goal for `key`, building a standard goal and its prerequisite
    /// chain on first request.
    pub fn resolve(&mut self, key: GoalKey) -> Result<GoalId, SchedulerError> {
        if let Some(id) = self.lookup(&key) {
            return Ok(id);
        }
        let job = key.job;
        let (prereq, pass, idempotent): (Option<GoalKind>, Box<dyn Pass>, bool) = match &key.kind {
            GoalKind::Parsed => (None, Box::new(ParsePass), true),
            GoalKind::TypeChecked => (Some(GoalKind::Parsed), Box::new(TypeCheckPass), true),
            GoalKind::Serialized => (Some(GoalKind::TypeChecked), Box::new(SerializedPass), true),
            GoalKind::Desugared => (Some(GoalKind::Serialized), Box::new(DesugarPass::new()), false),
            GoalKind::CodeGenerated => (Some(GoalKind::Desugared), Box::new(CodeGenPass), true),
            GoalKind::Emitted => (Some(GoalKind::CodeGenerated), Box::new(EmitPass), true),
            GoalKind::Custom(_) => return Err(SchedulerError::unknown_goal(&key)),
        };
        let prerequisites = match prereq {
            Some(kind) => vec![self.resolve(GoalKey::new(job, kind))?],
            None => Vec::new(),
        };
        self.intern_goal(key, prerequisites, pass, idempotent)
    }

    /// Add `prereq` as a prerequisite of `goal` unless that closes a cycle.
    pub fn add_prerequisite(&mut self, goal: GoalId, prereq: GoalId) -> Result<(), SchedulerError> {
        self.check_goal(goal)?;
        self.check_goal(prereq)?;
        if let Some(mut path) = self.path_between(prereq, goal) {
            path.push(prereq);
            let keys: Vec<GoalKey> = path.iter().map(|id| self.goals[id.0].key.clone()).collect();
            return Err(SchedulerError::cyclic(&keys));
        }
        let prereqs = &mut self.goals[goal.0].prerequisites;
        if !prereqs.contains(&prereq) {
            prereqs.push(prereq);
        }
        Ok(())
    }

    /// A prerequisite path from `from` to `to`, both ends included.
    fn path_between(&self, from: GoalId, to: GoalId) -> Option<Vec<GoalId>> {
        fn dfs(
            goals: &[Goal],
            cur: GoalId,
            to: GoalId,
            state: &mut [VisitState],
            path: &mut Vec<GoalId>,
        ) -> bool {
            if state[cur.0] != VisitState::Unseen {
                return false;
            }
            state[cur.0] = VisitState::Visiting;
            path.push(cur);
            if cur == to {
                return true;
            }
            for &next in &goals[cur.0].prerequisites {
                if dfs(goals, next, to, state, path) {
                    return true;
                }
            }
            path.pop();
            state[cur.0] = VisitState::Done;
            false
        }

        let mut state = vec![VisitState::Unseen; self.goals.len()];
        let mut path = Vec::new();
        dfs(&self.goals, from, to, &mut state, &mut path).then_some(path)
    }

    /// Run `id` and, first, everything it depends on.
    pub fn run(&mut self, id: GoalId) -> Result<(), SchedulerError> {
        self.check_goal(id)?;
        let key = self.goals[id.0].key.clone();
        match self.goals[id.0].status {
            GoalStatus::Succeeded => return Ok(()),
            GoalStatus::Failed => {
                let err = self.goals[id.0].failure.clone();
                return Err(err.unwrap_or_else(|| SchedulerError::previously_failed(&key)));
            }
            GoalStatus::Running => return Err(SchedulerError::cyclic(&[key.clone(), key])),
            GoalStatus::Pending => {}
        }
        self.set_status(id, GoalStatus::Running);

        let mut next_prereq = 0;
        loop {
            while let Some(&prereq) = self.goals[id.0].prerequisites.get(next_prereq) {
                if let Err(err) = self.run(prereq) {
                    if err.code() == ErrorCode::CyclicDependency {
                        return Err(self.fail(id, err));
                    }
                    return Err(self.fail(id, SchedulerError::prerequisite_failed(&key, &err)));
                }
                next_prereq += 1;
            }

            match self.invoke_pass(id) {
                Ok(()) => {
                    self.set_status(id, GoalStatus::Succeeded);
                    return Ok(());
                }
                Err(PassError::MissingDependency(dep)) => {
                    let goal = &self.goals[id.0];
                    if !goal.idempotent {
                        return Err(self.fail(id, SchedulerError::unresumable(&key, &dep)));
                    }
                    if goal.attempts >= MAX_PASS_ATTEMPTS {
                        let attempts = goal.attempts;
                        return Err(self.fail(id, SchedulerError::retry_limit(&key, attempts)));
                    }
                    debug!("{} waits on {}", key, dep);
                    let linked = self.resolve(dep).and_then(|dep_id| self.add_prerequisite(id, dep_id));
                    if let Err(err) = linked {
                        return Err(self.fail(id, err));
                    }
                }
                Err(PassError::Fatal(err)) => {
                    return Err(self.fail(id, SchedulerError::from_pass(&key, &err)));
                }
            }
        }
    }

    /// Invoke the pass of `id` once, without touching its prerequisites or
    /// status. Invoking the pass of a goal that already succeeded is an
    /// internal error.
    pub fn invoke_pass(&mut self, id: GoalId) -> Result<(), PassError> {
        self.check_goal(id)?;
        let goal = &mut self.goals[id.0];
        if goal.status == GoalStatus::Succeeded {
            return Err(SchedulerError::already_succeeded(&goal.key).into());
        }
        let key = goal.key.clone();
        let mut pass = goal.pass.take().ok_or_else(|| SchedulerError::unknown_goal(&key))?;
        goal.attempts += 1;

        let Some(job) = self.jobs.get_mut(key.job.0) else {
            self.goals[id.0].pass = Some(pass);
            return Err(SchedulerError::unknown_job(&key).into());
        };
        trace!("{}: running {} (attempt {})", key, pass.name(), self.goals[id.0].attempts);
        let mut env = PassEnv {
            job,
            ts: self.ts.as_mut(),
            lang: &self.lang,
            options: &self.options,
            frontend: self.frontend.as_mut(),
            emitter: self.emitter.as_mut(),
            jobs_by_stem: &self.jobs_by_stem,
        };
        let result = pass.run(&mut env);
        self.goals[id.0].pass = Some(pass);
        result
    }

    /// Mark `id` failed, remembering `err` for later runs.
    fn fail(&mut self, id: GoalId, err: SchedulerError) -> SchedulerError {
        debug!("goal {} failed: {}", self.goals[id.0].key, err);
        self.set_status(id, GoalStatus::Failed);
        self.goals[id.0].failure = Some(err.clone());
        err
    }

    fn set_status(&mut self, id: GoalId, status: GoalStatus) {
        let goal = &mut self.goals[id.0];
        debug!("goal {}: {} -> {}", goal.key, goal.status, status);
        goal.status = status;
    }

    /// Resolve and run the `Emitted` goal of `job`.
    pub fn compile_job(&mut self, job: JobId) -> Result<PathBuf, SchedulerError> {
        let key = GoalKey::new(job, GoalKind::Emitted);
        let id = self.resolve(key.clone())?;
        self.run(id)?;
        self.job(job)
            .and_then(|j| j.output.clone())
            .ok_or_else(|| SchedulerError::unknown_job(&key))
    }

    pub fn report(&self) -> Vec<GoalReport> {
        self.goals
            .iter()
            .map(|g| GoalReport {
                key: g.key.clone(),
                pass: g.pass.as_ref().map(|p| p.name().to_string()).unwrap_or_default(),
                status: g.status,
                attempts: g.attempts,
            })
            .collect()
    }
}
