//! Compiler boundary and pdflatex-backed implementation.

use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};

pub const DEFAULT_COMPILER_PROGRAM: &str = "pdflatex";
pub const ARTIFACT_EXTENSION: &str = "pdf";

/// Captured result of one compiler pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutput {
    /// Exit status reported success. Not trusted as the success signal.
    pub exit_ok: bool,
    /// Combined stdout and stderr.
    pub transcript: String,
}

#[derive(Debug)]
pub enum CompilerInvokeError {
    ToolMissing {
        program: String,
        source: std::io::Error,
    },
    Io(std::io::Error),
}

impl Display for CompilerInvokeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToolMissing { program, source } => {
                write!(f, "compiler `{program}` not found: {source}")
            }
            Self::Io(err) => write!(f, "compiler i/o error: {err}"),
        }
    }
}

impl Error for CompilerInvokeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ToolMissing { source, .. } => Some(source),
            Self::Io(err) => Some(err),
        }
    }
}

/// Compiles a source document into a same-stem artifact next to it.
///
/// Implementations must be idempotent across repeated passes.
pub trait DocumentCompiler {
    fn program(&self) -> &str;

    /// Runs one pass over `source` with `work_dir` as output directory.
    fn run_pass(&self, source: &Path, work_dir: &Path) -> Result<PassOutput, CompilerInvokeError>;

    fn artifact_extension(&self) -> &str {
        ARTIFACT_EXTENSION
    }
}

/// Runs `pdflatex -interaction=nonstopmode <file>` inside the work dir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLatexCompiler {
    program: String,
}

impl PdfLatexCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdfLatexCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILER_PROGRAM)
    }
}

impl DocumentCompiler for PdfLatexCompiler {
    fn program(&self) -> &str {
        &self.program
    }

    fn run_pass(&self, source: &Path, work_dir: &Path) -> Result<PassOutput, CompilerInvokeError> {
        let file_name = source.file_name().unwrap_or(source.as_os_str());
        let output = Command::new(&self.program)
            .current_dir(work_dir)
            .arg("-interaction=nonstopmode")
            .arg(file_name)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => CompilerInvokeError::ToolMissing {
                    program: self.program.clone(),
                    source: err,
                },
                _ => CompilerInvokeError::Io(err),
            })?;

        let mut transcript = String::from_utf8_lossy(&output.stdout).into_owned();
        transcript.push_str(&String::from_utf8_lossy(&output.stderr));
        debug!(
            "event=compile_pass module=compiler status={} program={} exit_code={:?}",
            if output.status.success() { "ok" } else { "nonzero" },
            self.program,
            output.status.code()
        );

        Ok(PassOutput {
            exit_ok: output.status.success(),
            transcript,
        })
    }
}
