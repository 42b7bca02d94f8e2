use crate::error::{ErrorCode, JavelinErrorExt, Level, impl_error_ext};
use crate::location::Location;
use crate::types::TypeError;

#[derive(Debug, Clone)]
pub struct DesugarError {
    level: Level,
    code: ErrorCode,
    message: String,
    issuer: &'static str,
    location: Option<Location>,
}

impl DesugarError {
    fn new(level: Level, code: ErrorCode, message: String) -> Self {
        DesugarError { level, code, message, issuer: "javelin.desugar", location: None }
    }

    pub fn missing_library_type(name: &str, cause: &TypeError) -> Self {
        DesugarError::new(
            Level::Critical,
            ErrorCode::MissingLibraryType,
            format!("required library type '{}' does not resolve: {}", name, cause.message()),
        )
    }

    pub fn rerun(job: &str) -> Self {
        DesugarError::new(
            Level::Critical,
            ErrorCode::NonIdempotentRerun,
            format!("desugaring passes are not idempotent; '{}' was already desugared", job),
        )
    }

    /// A class lookup failed after rewriting began. The pipeline cannot be
    /// resumed, so this is fatal.
    pub fn missing_dependency(cause: &TypeError) -> Self {
        DesugarError::new(
            Level::Critical,
            ErrorCode::MissingDependency,
            format!("class '{}' is needed mid-pipeline but does not resolve", cause.name),
        )
    }

    pub fn broken_chain(from: &str, to: &str) -> Self {
        DesugarError::new(
            Level::Error,
            ErrorCode::Internal,
            format!("no enclosing instance of '{}' is reachable from '{}'", to, from),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DesugarError::new(Level::Critical, ErrorCode::Internal, message.into())
    }

    pub fn at(mut self, location: Option<&Location>) -> Self {
        if self.location.is_none() {
            self.location = location.cloned();
        }
        self
    }
}

impl_error_ext!(DesugarError);
