//! Two-pass compile state machine with guaranteed cleanup.
//!
//! `Invoke#1 -> Invoke#2 -> Verify -> Cleanup -> Done | Failed`
//!
//! Pass 2 always runs, whatever pass 1 reported, so cross-references and
//! page numbers settle. Cleanup lives in a drop guard and therefore also runs
//! on early returns.

use crate::compile::compiler::{CompilerInvokeError, DocumentCompiler};
use log::{error, info, warn};
use std::error::Error;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Byproduct extensions removed after every run. The source document is
/// itself an intermediate.
pub const INTERMEDIATE_EXTENSIONS: &[&str] = &["tex", "aux", "log", "out", "toc", "fls"];

const COMPILER_PASSES: usize = 2;
const MAX_DIAGNOSTIC_CHARS: usize = 4000;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug)]
pub enum CompileError {
    ToolMissing {
        program: String,
    },
    /// Both passes ran but the artifact is absent.
    CompilationFailed {
        program: String,
        artifact: PathBuf,
        /// Tail of the captured compiler transcript.
        diagnostics: String,
    },
    UnexpectedError {
        program: String,
        message: String,
    },
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToolMissing { program } => write!(
                f,
                "compiler `{program}` was not found on PATH; install a TeX distribution"
            ),
            Self::CompilationFailed {
                program, artifact, ..
            } => write!(
                f,
                "compiler `{program}` did not produce `{}`; compiler output was written to the application log",
                artifact.display()
            ),
            Self::UnexpectedError { program, message } => {
                write!(f, "unexpected error while running `{program}`: {message}")
            }
        }
    }
}

impl Error for CompileError {}

/// Drives a [`DocumentCompiler`] over one source document.
pub struct CompilerDriver<C> {
    compiler: C,
}

impl<C: DocumentCompiler> CompilerDriver<C> {
    pub fn new(compiler: C) -> Self {
        Self { compiler }
    }

    /// Compiles `source` and returns the artifact path next to it.
    ///
    /// A stale artifact from an earlier run is removed first so that
    /// verification only accepts output of this run.
    pub fn compile(&self, source: &Path) -> CompileResult<PathBuf> {
        let program = self.compiler.program().to_string();
        let work_dir = work_dir_of(source);
        let artifact = sibling_with_extension(source, self.compiler.artifact_extension());
        let _cleanup = IntermediateCleanup::new(source);

        if artifact.exists() {
            std::fs::remove_file(&artifact).map_err(|err| CompileError::UnexpectedError {
                program: program.clone(),
                message: format!("cannot remove stale `{}`: {err}", artifact.display()),
            })?;
        }

        info!(
            "event=compile module=compile_driver status=start program={program} source={}",
            source.display()
        );

        let mut transcript = String::new();
        for pass in 1..=COMPILER_PASSES {
            match self.compiler.run_pass(source, &work_dir) {
                Ok(output) => {
                    if !output.exit_ok {
                        warn!(
                            "event=compile_pass module=compile_driver status=nonzero program={program} pass={pass}"
                        );
                    }
                    transcript.push_str(&output.transcript);
                }
                Err(CompilerInvokeError::ToolMissing { .. }) => {
                    error!(
                        "event=compile module=compile_driver status=error error_code=tool_missing program={program}"
                    );
                    return Err(CompileError::ToolMissing { program });
                }
                Err(CompilerInvokeError::Io(err)) => {
                    error!(
                        "event=compile module=compile_driver status=error error_code=unexpected program={program} pass={pass} error={err}"
                    );
                    return Err(CompileError::UnexpectedError {
                        program,
                        message: err.to_string(),
                    });
                }
            }
        }

        if !artifact.exists() {
            error!(
                "event=compile module=compile_driver status=error error_code=no_artifact program={program} artifact={} transcript={transcript:?}",
                artifact.display()
            );
            return Err(CompileError::CompilationFailed {
                program,
                artifact,
                diagnostics: tail_chars(&transcript, MAX_DIAGNOSTIC_CHARS),
            });
        }

        info!(
            "event=compile module=compile_driver status=ok program={program} artifact={}",
            artifact.display()
        );
        Ok(artifact)
    }
}

/// Removes `<stem>.<ext>` for every intermediate extension on drop.
struct IntermediateCleanup {
    targets: Vec<PathBuf>,
}

impl IntermediateCleanup {
    fn new(source: &Path) -> Self {
        let targets = INTERMEDIATE_EXTENSIONS
            .iter()
            .map(|ext| sibling_with_extension(source, ext))
            .collect();
        Self { targets }
    }
}

impl Drop for IntermediateCleanup {
    fn drop(&mut self) {
        for path in &self.targets {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!(
                    "event=compile_cleanup module=compile_driver status=error path={} error={err}",
                    path.display()
                ),
            }
        }
    }
}

fn work_dir_of(source: &Path) -> PathBuf {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `dir/stem.ext` for the given source, keeping dots inside the stem.
pub fn sibling_with_extension(source: &Path, extension: &str) -> PathBuf {
    let stem = source.file_stem().unwrap_or(source.as_os_str());
    let mut file_name: OsString = stem.to_owned();
    file_name.push(".");
    file_name.push(extension);
    work_dir_of(source).join(file_name)
}

fn tail_chars(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    text.chars().skip(count - max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::{sibling_with_extension, tail_chars};
    use std::path::Path;

    #[test]
    fn sibling_replaces_only_last_extension() {
        let path = sibling_with_extension(Path::new("/out/exam_1_v1.2.tex"), "pdf");
        assert_eq!(path, Path::new("/out/exam_1_v1.2.pdf"));
    }

    #[test]
    fn sibling_of_bare_file_uses_current_dir() {
        let path = sibling_with_extension(Path::new("exam.tex"), "aux");
        assert_eq!(path, Path::new("./exam.aux"));
    }

    #[test]
    fn tail_keeps_last_chars() {
        assert_eq!(tail_chars("abcdef", 3), "def");
        assert_eq!(tail_chars("ab", 3), "ab");
    }
}
