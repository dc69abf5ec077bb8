//! Markup converter boundary and pandoc-backed implementation.

use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

pub const DEFAULT_CONVERTER_PROGRAM: &str = "pandoc";
pub const SOURCE_FORMAT: &str = "markdown";
pub const TARGET_FORMAT_LATEX: &str = "latex";

#[derive(Debug)]
pub enum ConverterError {
    /// Converter binary missing or not executable.
    Unavailable {
        program: String,
        source: std::io::Error,
    },
    /// Converter ran and rejected the input.
    Conversion { program: String, message: String },
    Io(std::io::Error),
}

impl Display for ConverterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { program, source } => write!(
                f,
                "markup converter `{program}` is not available: {source}"
            ),
            Self::Conversion { program, message } => {
                write!(f, "markup converter `{program}` failed: {message}")
            }
            Self::Io(err) => write!(f, "markup converter i/o error: {err}"),
        }
    }
}

impl Error for ConverterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable { source, .. } => Some(source),
            Self::Conversion { .. } => None,
            Self::Io(err) => Some(err),
        }
    }
}

/// Converts task markup into the target typeset markup.
pub trait MarkupConverter {
    fn convert(&self, source: &str, target_format: &str) -> Result<String, ConverterError>;
}

/// Pipes markdown through `pandoc --from markdown --to <target>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PandocConverter {
    program: String,
}

impl PandocConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTER_PROGRAM)
    }
}

impl MarkupConverter for PandocConverter {
    fn convert(&self, source: &str, target_format: &str) -> Result<String, ConverterError> {
        let mut child = Command::new(&self.program)
            .args(["--from", SOURCE_FORMAT, "--to", target_format])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => ConverterError::Unavailable {
                    program: self.program.clone(),
                    source: err,
                },
                _ => ConverterError::Io(err),
            })?;

        // An early exit breaks the pipe; exit status and stderr decide the error.
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(source.as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output().map_err(ConverterError::Io)?;
        if !output.status.success() {
            return Err(ConverterError::Conversion {
                program: self.program.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        write_result.map_err(ConverterError::Io)?;

        debug!(
            "event=markup_convert module=converter status=ok program={} target={target_format} bytes_in={} bytes_out={}",
            self.program,
            source.len(),
            output.stdout.len()
        );
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConverterError, MarkupConverter, PandocConverter};

    #[test]
    fn missing_program_is_reported_as_unavailable() {
        let converter = PandocConverter::new("exambank-no-such-converter-binary");
        let err = converter.convert("# hi", "latex").unwrap_err();
        assert!(matches!(err, ConverterError::Unavailable { .. }));
        assert!(err.to_string().contains("exambank-no-such-converter-binary"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn early_exit_reports_conversion_with_stderr() {
        // `ls` rejects the converter flags and exits without reading stdin.
        let converter = PandocConverter::new("ls");
        let large_input = "x".repeat(4 * 1024 * 1024);

        let err = converter.convert(&large_input, "latex").unwrap_err();
        match err {
            ConverterError::Conversion { program, message } => {
                assert_eq!(program, "ls");
                assert!(message.contains("from"), "stderr was: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
