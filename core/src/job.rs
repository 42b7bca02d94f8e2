use std::path::{Path, PathBuf};

use crate::ast::AstNode;
use crate::ir::IrModule;
use crate::scheduler::JobId;

/// One compilation unit and everything the passes produce for it.
#[derive(Debug)]
pub struct Job {
    pub id: JobId,
    /// Input stem up to the first dot: `Foo` for `src/Foo.java.json`.
    pub name: String,
    pub input: PathBuf,
    /// Path of the original source file, when the front end reports one.
    pub source: Option<PathBuf>,
    pub ast: Option<AstNode>,
    pub module: Option<IrModule>,
    pub output: Option<PathBuf>,
}

impl Job {
    pub fn new(id: JobId, input: PathBuf) -> Self {
        Job { id, name: unit_name(&input), input, source: None, ast: None, module: None, output: None }
    }
}

fn unit_name(path: &Path) -> String {
    let file = path.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default();
    match file.split('.').next() {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_stem_before_first_dot() {
        let job = Job::new(JobId(0), PathBuf::from("src/demo/Foo.java.json"));
        assert_eq!(job.name, "Foo");
    }
}
