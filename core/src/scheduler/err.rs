use super::goal::{GoalId, GoalKey};
use crate::error::{BoxedError, ErrorCode, Level, impl_error_ext};
use crate::location::Location;

/// Reported by `Scheduler::run`; names the goal that failed and why.
#[derive(Debug, Clone)]
pub struct SchedulerError {
    level: Level,
    code: ErrorCode,
    message: String,
    issuer: &'static str,
    location: Option<Location>,
    pub goal: Option<GoalKey>,
    /// The goal whose own pass failed, when this error was raised on
    /// behalf of a dependent.
    pub root: Option<GoalKey>,
    reason: Option<String>,
}

impl SchedulerError {
    fn new(code: ErrorCode, goal: Option<&GoalKey>, message: String) -> Self {
        SchedulerError {
            level: Level::Error,
            code,
            message,
            issuer: "javelin.scheduler",
            location: None,
            goal: goal.cloned(),
            root: None,
            reason: None,
        }
    }

    pub fn cyclic(path: &[GoalKey]) -> Self {
        let chain = path.iter().map(GoalKey::to_string).collect::<Vec<_>>().join(" -> ");
        SchedulerError::new(ErrorCode::CyclicDependency, path.first(), format!("goal dependency cycle: {}", chain))
    }

    /// `goal` could not run because a prerequisite failed with `cause`.
    /// Level, code and location are those of the goal whose pass failed,
    /// and the message keeps its text.
    pub fn prerequisite_failed(goal: &GoalKey, cause: &SchedulerError) -> Self {
        let root = cause.root.clone().or_else(|| cause.goal.clone());
        let reason = cause.reason.clone().unwrap_or_else(|| cause.message.clone());
        let message = match &root {
            Some(root) => format!("goal {} not run: prerequisite {} failed: {}", goal, root, reason),
            None => format!("goal {} not run: {}", goal, reason),
        };
        SchedulerError {
            level: cause.level,
            code: cause.code,
            message,
            issuer: "javelin.scheduler",
            location: cause.location.clone(),
            goal: Some(goal.clone()),
            root,
            reason: Some(reason),
        }
    }

    /// A goal that failed earlier and has no recorded cause.
    pub fn previously_failed(goal: &GoalKey) -> Self {
        SchedulerError::new(ErrorCode::PrerequisiteFailed, Some(goal), format!("goal {} already failed", goal))
    }

    pub fn unknown_goal(goal: &GoalKey) -> Self {
        SchedulerError::new(ErrorCode::Internal, Some(goal), format!("no goal is registered for {}", goal))
    }

    pub fn unknown_goal_id(id: GoalId) -> Self {
        SchedulerError::new(ErrorCode::Internal, None, format!("goal id {} does not belong to this scheduler", id.0))
    }

    pub fn unknown_job(goal: &GoalKey) -> Self {
        SchedulerError::new(ErrorCode::Internal, Some(goal), format!("goal {} refers to an unknown job", goal))
    }

    pub fn already_succeeded(goal: &GoalKey) -> Self {
        let mut err = SchedulerError::new(
            ErrorCode::Internal,
            Some(goal),
            format!("pass of goal {} invoked again after it succeeded", goal),
        );
        err.level = Level::Critical;
        err
    }

    pub fn unresumable(goal: &GoalKey, dependency: &GoalKey) -> Self {
        let mut err = SchedulerError::new(
            ErrorCode::MissingDependency,
            Some(goal),
            format!("goal {} cannot be resumed after discovering dependency {}", goal, dependency),
        );
        err.level = Level::Critical;
        err
    }

    pub fn retry_limit(goal: &GoalKey, attempts: usize) -> Self {
        SchedulerError::new(
            ErrorCode::MissingDependency,
            Some(goal),
            format!("goal {} still missing dependencies after {} attempts", goal, attempts),
        )
    }

    /// Wrap a fatal pass error, keeping its code, level and location.
    pub fn from_pass(goal: &GoalKey, err: &BoxedError) -> Self {
        SchedulerError {
            level: err.level(),
            code: err.code(),
            message: format!("{}: {}", goal, err.message()),
            issuer: "javelin.scheduler",
            location: err.location(),
            goal: Some(goal.clone()),
            root: None,
            reason: None,
        }
    }
}

impl_error_ext!(SchedulerError);
