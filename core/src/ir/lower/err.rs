use crate::ast::NodeTag;
use crate::error::{ErrorCode, Level, impl_error_ext};
use crate::location::Location;

#[derive(Debug, Clone)]
pub struct LoweringError {
    level: Level,
    code: ErrorCode,
    message: String,
    issuer: &'static str,
    location: Option<Location>,
}

impl LoweringError {
    /// An operator/type combination the lowering tables have no entry for.
    pub fn unreachable(what: impl std::fmt::Display, ty: impl std::fmt::Display) -> Self {
        LoweringError {
            level: Level::Critical,
            code: ErrorCode::UnreachableLowering,
            message: format!("no lowering for '{}' on operands of type {}", what, ty),
            issuer: "javelin.ir.lower",
            location: None,
        }
    }

    pub fn unsupported(tag: NodeTag, hook: &str) -> Self {
        LoweringError {
            level: Level::Critical,
            code: ErrorCode::UnsupportedNode,
            message: format!("{} nodes do not support {}", tag, hook),
            issuer: "javelin.ir.lower",
            location: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        LoweringError {
            level: Level::Critical,
            code: ErrorCode::Internal,
            message: message.into(),
            issuer: "javelin.ir.lower",
            location: None,
        }
    }

    /// Attach a source location unless one is already present.
    pub fn at(mut self, location: Option<&Location>) -> Self {
        if self.location.is_none() {
            self.location = location.cloned();
        }
        self
    }
}

impl_error_ext!(LoweringError);
