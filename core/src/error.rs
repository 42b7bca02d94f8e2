use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_str = match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        };
        write!(f, "{}", level_str)
    }
}

/// Classifies every fatal condition the back end can raise. All of them
/// abort the compilation of the current job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A goal transitively depends on itself.
    CyclicDependency,
    /// A non-idempotent pass was invoked a second time for the same job.
    NonIdempotentRerun,
    /// A type from the required-library manifest failed to resolve.
    MissingLibraryType,
    /// A pass discovered a dependency that could not be resumed.
    MissingDependency,
    /// An operator/type combination with no lowering reached codegen.
    UnreachableLowering,
    /// A node kind reached a codegen hook with no applicable behavior.
    UnsupportedNode,
    /// A goal could not run because one of its prerequisites failed.
    PrerequisiteFailed,
    Frontend,
    Io,
    Verification,
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::CyclicDependency => "cyclic-dependency",
            ErrorCode::NonIdempotentRerun => "non-idempotent-rerun",
            ErrorCode::MissingLibraryType => "missing-library-type",
            ErrorCode::MissingDependency => "missing-dependency",
            ErrorCode::UnreachableLowering => "unreachable-lowering",
            ErrorCode::UnsupportedNode => "unsupported-node",
            ErrorCode::PrerequisiteFailed => "prerequisite-failed",
            ErrorCode::Frontend => "frontend",
            ErrorCode::Io => "io",
            ErrorCode::Verification => "verification",
            ErrorCode::Internal => "internal",
        };
        write!(f, "{}", s)
    }
}

pub trait JavelinErrorExt {
    fn level(&self) -> Level;
    fn code(&self) -> ErrorCode;
    fn message(&self) -> String;
    fn issuer(&self) -> String;
    fn span(&self) -> Option<crate::location::Span>;
    fn location(&self) -> Option<crate::location::Location>;
}

/// The error currency passed between subsystems.
pub type BoxedError = Box<dyn JavelinErrorExt>;

impl fmt::Debug for dyn JavelinErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc_str = match self.location() {
            Some(loc) => loc.to_string(),
            None => "unknown".to_string(),
        };
        let span_str = match self.span() {
            Some(span) => span.to_string(),
            None => "span:none".to_string(),
        };

        write!(
            f,
            "JAVELIN | {} | {} | {} | {} | {} | {}",
            self.level(),
            self.code(),
            loc_str,
            self.issuer(),
            span_str,
            self.message()
        )
    }
}

impl fmt::Display for dyn JavelinErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Implements `Display`, `Error` and `JavelinErrorExt` for an error struct
/// carrying the usual `level`/`code`/`message`/`issuer`/`location` fields.
macro_rules! impl_error_ext {
    ($ty:ty) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match &self.location {
                    Some(loc) => write!(f, "[{}] {} (at {})", self.code, self.message, loc),
                    None => write!(f, "[{}] {}", self.code, self.message),
                }
            }
        }

        impl std::error::Error for $ty {}

        impl $crate::error::JavelinErrorExt for $ty {
            fn level(&self) -> $crate::error::Level {
                self.level
            }

            fn code(&self) -> $crate::error::ErrorCode {
                self.code
            }

            fn message(&self) -> String {
                self.message.clone()
            }

            fn issuer(&self) -> String {
                self.issuer.to_string()
            }

            fn span(&self) -> Option<$crate::location::Span> {
                self.location.clone().map($crate::location::Span::point)
            }

            fn location(&self) -> Option<$crate::location::Location> {
                self.location.clone()
            }
        }
    };
}

pub(crate) use impl_error_ext;
