use crate::error::{ErrorCode, Level, impl_error_ext};
use crate::location::Location;

/// Raised by `TypeSystem` lookups.
#[derive(Debug, Clone)]
pub struct TypeError {
    level: Level,
    code: ErrorCode,
    message: String,
    issuer: &'static str,
    location: Option<Location>,
    /// The class name that failed to resolve.
    pub name: String,
}

impl TypeError {
    pub fn unresolved(name: &str) -> Self {
        TypeError {
            level: Level::Error,
            code: ErrorCode::Frontend,
            message: format!("cannot resolve class '{}'", name),
            issuer: "javelin.types",
            location: None,
            name: name.to_string(),
        }
    }

    pub fn circular(name: &str) -> Self {
        TypeError {
            level: Level::Error,
            code: ErrorCode::Frontend,
            message: format!("circular superclass chain through '{}'", name),
            issuer: "javelin.types",
            location: None,
            name: name.to_string(),
        }
    }
}

impl_error_ext!(TypeError);
