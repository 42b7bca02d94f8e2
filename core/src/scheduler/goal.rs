use std::fmt;

use super::err::SchedulerError;
use super::pass::Pass;

/// Index of a job (compilation unit) in the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub usize);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GoalKind {
    Parsed,
    TypeChecked,
    /// Placeholder kept between type checking and desugaring; its pass
    /// does nothing.
    Serialized,
    Desugared,
    CodeGenerated,
    Emitted,
    Custom(String),
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalKind::Parsed => f.write_str("Parsed"),
            GoalKind::TypeChecked => f.write_str("TypeChecked"),
            GoalKind::Serialized => f.write_str("Serialized"),
            GoalKind::Desugared => f.write_str("Desugared"),
            GoalKind::CodeGenerated => f.write_str("CodeGenerated"),
            GoalKind::Emitted => f.write_str("Emitted"),
            GoalKind::Custom(name) => write!(f, "Custom({})", name),
        }
    }
}

/// Identity of a goal: two goals with equal keys are the same goal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GoalKey {
    pub job: JobId,
    pub kind: GoalKind,
}

impl GoalKey {
    pub fn new(job: JobId, kind: GoalKind) -> Self {
        GoalKey { job, kind }
    }
}

impl fmt::Display for GoalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.job, self.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GoalId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GoalStatus::Pending => "pending",
            GoalStatus::Running => "running",
            GoalStatus::Succeeded => "succeeded",
            GoalStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

pub struct Goal {
    pub key: GoalKey,
    /// Run in this order before the goal's own pass.
    pub prerequisites: Vec<GoalId>,
    pub status: GoalStatus,
    /// Number of times the pass has been invoked.
    pub attempts: usize,
    /// Whether the pass may be re-invoked after reporting a missing
    /// dependency.
    pub idempotent: bool,
    pub(crate) pass: Option<Box<dyn Pass>>,
    /// Why the goal failed; returned again to later runs.
    pub failure: Option<SchedulerError>,
}

impl Goal {
    pub(crate) fn new(key: GoalKey, pass: Box<dyn Pass>, idempotent: bool) -> Self {
        Goal { key, prerequisites: Vec::new(), status: GoalStatus::Pending, attempts: 0, idempotent, pass: Some(pass), failure: None }
    }
}

/// One row of `Scheduler::report`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalReport {
    pub key: GoalKey,
    pub pass: String,
    pub status: GoalStatus,
    pub attempts: usize,
}
