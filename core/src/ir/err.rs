//! Errors raised after a module has been built: verification and emission.

use crate::error::{ErrorCode, Level, impl_error_ext};
use crate::location::Location;

#[derive(Debug, Clone)]
pub struct IrError {
    level: Level,
    code: ErrorCode,
    message: String,
    issuer: &'static str,
    location: Option<Location>,
}

impl IrError {
    pub fn verification(function: &str, message: impl Into<String>) -> Self {
        IrError {
            level: Level::Error,
            code: ErrorCode::Verification,
            message: format!("in function '{}': {}", function, message.into()),
            issuer: "javelin.ir.verify",
            location: None,
        }
    }

    pub fn io(path: &std::path::Path, err: &std::io::Error) -> Self {
        IrError {
            level: Level::Error,
            code: ErrorCode::Io,
            message: format!("failed to write '{}': {}", path.display(), err),
            issuer: "javelin.ir.emit",
            location: None,
        }
    }
}

impl_error_ext!(IrError);
