//! Exam document template and renderer.

use crate::render::converter::{ConverterError, MarkupConverter, TARGET_FORMAT_LATEX};
use chrono::NaiveDate;
use log::{error, info};
use std::error::Error;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const SOURCE_EXTENSION: &str = "tex";
pub const TASKS_MARKER: &str = "%% EXAM-TASKS %%";
const MODULE_NAME_PLACEHOLDER: &str = "{{MODULE_NAME}}";
const EXAM_DATE_PLACEHOLDER: &str = "{{EXAM_DATE}}";
const EXAM_DATE_FORMAT: &str = "%d.%m.%Y";

const EXAM_TEMPLATE: &str = r"\documentclass[12pt, a4paper]{article}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{lmodern}
\usepackage{amsmath}
\usepackage{amssymb}
\usepackage{graphicx}
\usepackage{longtable}
\usepackage{booktabs}
\usepackage{hyperref}
\usepackage[left=2.5cm, right=2.5cm, top=2.5cm, bottom=3cm]{geometry}
\usepackage{parskip}
\providecommand{\tightlist}{\setlength{\itemsep}{0pt}\setlength{\parskip}{0pt}}

\begin{document}

\Large
\textbf{Exam: {{MODULE_NAME}}}
\normalsize

\vspace{0.5cm}
\begin{tabular}{ll}
    \textbf{Date:} & {{EXAM_DATE}} \\
    \textbf{Name:} & \rule{8cm}{0.4pt} \\
    \textbf{Student ID:} & \rule{8cm}{0.4pt} \\
\end{tabular}
\vspace{0.5cm}
\hrulefill
\vspace{1cm}

%% EXAM-TASKS %%

\end{document}
";

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug)]
pub enum RenderError {
    /// Conversion of task `task_number` (1-indexed) failed; nothing was written.
    Conversion {
        task_number: usize,
        source: ConverterError,
    },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conversion {
                task_number,
                source,
            } => write!(f, "cannot convert task {task_number}: {source}"),
            Self::Io { path, source } => {
                write!(f, "cannot write `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Conversion { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Turns selected task markup into one typeset source document.
pub struct DocumentRenderer<C> {
    converter: C,
}

impl<C: MarkupConverter> DocumentRenderer<C> {
    pub fn new(converter: C) -> Self {
        Self { converter }
    }

    /// Writes `<base_path>.tex` and returns its path.
    ///
    /// # Errors
    /// - `Conversion` on the first task the converter rejects.
    /// - `Io` when the document cannot be written.
    pub fn render(
        &self,
        module_name: &str,
        contents: &[&str],
        exam_date: NaiveDate,
        base_path: &Path,
    ) -> RenderResult<PathBuf> {
        let document = self.render_to_string(module_name, contents, exam_date)?;
        let path = source_path_for(base_path);

        if let Err(source) = std::fs::write(&path, document) {
            error!(
                "event=document_render module=renderer status=error path={} error={source}",
                path.display()
            );
            let _ = std::fs::remove_file(&path);
            return Err(RenderError::Io { path, source });
        }

        info!(
            "event=document_render module=renderer status=ok tasks={} path={}",
            contents.len(),
            path.display()
        );
        Ok(path)
    }

    /// Builds the full document text without touching the filesystem.
    pub fn render_to_string(
        &self,
        module_name: &str,
        contents: &[&str],
        exam_date: NaiveDate,
    ) -> RenderResult<String> {
        let mut sections = Vec::with_capacity(contents.len());
        for (index, markup) in contents.iter().enumerate() {
            let task_number = index + 1;
            let converted = self
                .converter
                .convert(markup, TARGET_FORMAT_LATEX)
                .map_err(|source| {
                    error!(
                        "event=document_render module=renderer status=error task_number={task_number} error={source}"
                    );
                    RenderError::Conversion {
                        task_number,
                        source,
                    }
                })?;
            sections.push(wrap_task(task_number, &converted));
        }

        Ok(EXAM_TEMPLATE
            .replace(MODULE_NAME_PLACEHOLDER, &escape_latex(module_name))
            .replace(
                EXAM_DATE_PLACEHOLDER,
                &exam_date.format(EXAM_DATE_FORMAT).to_string(),
            )
            .replace(TASKS_MARKER, &sections.join("\n\n")))
    }
}

/// Appends the source extension without clobbering dots in the stem.
pub fn source_path_for(base_path: &Path) -> PathBuf {
    let mut raw: OsString = base_path.as_os_str().to_owned();
    raw.push(".");
    raw.push(SOURCE_EXTENSION);
    PathBuf::from(raw)
}

fn wrap_task(task_number: usize, body: &str) -> String {
    format!(
        "\\section*{{Task {task_number}}}\n{}\n\\vfill\n\\pagebreak[3]",
        body.trim_end()
    )
}

/// Escapes characters with special meaning in LaTeX text mode.
pub fn escape_latex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str(r"\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '~' => escaped.push_str(r"\textasciitilde{}"),
            '^' => escaped.push_str(r"\textasciicircum{}"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
