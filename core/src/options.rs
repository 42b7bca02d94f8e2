use std::path::PathBuf;

/// Compiler configuration, filled in by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Extension of emitted files, without the dot.
    pub output_ext: String,
    /// Extension stripped from source names when deriving output names.
    pub source_ext: String,
    /// Fully qualified class whose `main(String[])` the synthesized
    /// `main` function calls.
    pub entry_point: Option<String>,
    /// Print each unit's AST to stderr after desugaring.
    pub dump_desugared: bool,
    pub output_dir: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            output_ext: "ll".to_string(),
            source_ext: "java".to_string(),
            entry_point: None,
            dump_desugared: false,
            output_dir: None,
        }
    }
}
