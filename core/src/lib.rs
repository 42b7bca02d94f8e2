pub mod ast;
pub mod compiler;
pub mod desugar;
pub mod dispatch;
pub mod error;
pub mod frontend;
pub mod ir;
pub mod job;
pub mod location;
pub mod options;
pub mod scheduler;
pub mod types;

pub use ast::{AstNode, AstNodeKind};
pub use compiler::{Compiler, expand_sources};
pub use desugar::{DesugarError, DesugarPipeline};
pub use dispatch::Lang;
pub use error::{BoxedError, ErrorCode, JavelinErrorExt, Level};
pub use frontend::{CompilationUnitFile, Frontend, FrontendError, JsonFrontend, MemoryFrontend};
pub use ir::{IrError, IrModule};
pub use job::Job;
pub use location::{Location, Span};
pub use options::Options;
pub use scheduler::{GoalKind, GoalStatus, JobId, Scheduler, SchedulerError};
pub use types::{ClassTable, Type, TypeSystem};

pub fn generate_error_report<E: JavelinErrorExt + ?Sized>(error: &E) -> String {
    let level = error.level();
    let location = match error.location() {
        Some(loc) => loc.to_string(),
        None => "unknown location".to_string(),
    };
    let message = error.message();

    format!("JAVELIN | {} | {} | {}", level, location, message)
}
