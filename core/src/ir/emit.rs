//! Hand-off of a verified module to the output writer.

use std::path::{Path, PathBuf};

use log::info;

use super::err::IrError;
use super::module::IrModule;
use crate::options::Options;

pub trait Emitter {
    /// Write `module` to `path`.
    fn emit(&mut self, module: &IrModule, path: &Path) -> Result<(), IrError>;
}

/// Writes the textual form of the module to disk.
#[derive(Debug, Default)]
pub struct TextEmitter;

impl Emitter for TextEmitter {
    fn emit(&mut self, module: &IrModule, path: &Path) -> Result<(), IrError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| IrError::io(parent, &e))?;
        }
        std::fs::write(path, module.to_string()).map_err(|e| IrError::io(path, &e))?;
        info!("wrote {}", path.display());
        Ok(())
    }
}

/// Keeps emitted modules in memory instead of writing them.
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    pub emitted: Vec<(PathBuf, IrModule)>,
}

impl Emitter for MemoryEmitter {
    fn emit(&mut self, module: &IrModule, path: &Path) -> Result<(), IrError> {
        self.emitted.push((path.to_path_buf(), module.clone()));
        Ok(())
    }
}

/// Output file for `source`: the source extension is replaced by the
/// configured output extension and, when an output directory is set, the
/// file name is placed there instead of next to the source.
pub fn output_path(source: &Path, options: &Options) -> PathBuf {
    let file_name = source.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let suffix = format!(".{}", options.source_ext);
    let stem = file_name.strip_suffix(&suffix).unwrap_or(&file_name);
    let out_name = format!("{}.{}", stem, options.output_ext);
    match &options.output_dir {
        Some(dir) => dir.join(out_name),
        None => source.with_file_name(out_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_source_extension() {
        let opts = Options::default();
        assert_eq!(output_path(Path::new("src/a/Main.java"), &opts), PathBuf::from("src/a/Main.ll"));
    }

    #[test]
    fn keeps_unrelated_extension_and_appends() {
        let opts = Options::default();
        assert_eq!(output_path(Path::new("Main.txt"), &opts), PathBuf::from("Main.txt.ll"));
    }

    #[test]
    fn honors_output_dir_and_extension() {
        let opts = Options { output_ext: "bc".into(), output_dir: Some(PathBuf::from("out")), ..Options::default() };
        assert_eq!(output_path(Path::new("src/Main.java"), &opts), PathBuf::from("out/Main.bc"));
    }
}
