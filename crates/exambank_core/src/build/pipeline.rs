use crate::assembly::selector::{select_tasks, AssemblyError};
use crate::compile::compiler::DocumentCompiler;
use crate::compile::driver::{CompileError, CompilerDriver};
use crate::db::DbError;
use crate::model::content::ModuleId;
use crate::render::converter::MarkupConverter;
use crate::render::document::{DocumentRenderer, RenderError};
use crate::repo::content_repo::ContentRepository;
use crate::repo::exam_config_repo::ExamConfigRepository;
use chrono::{Local, NaiveDate};
use log::{error, info};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

static UNSAFE_FILE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("valid file name regex"));

const FALLBACK_STEM: &str = "module";

/// Input of one exam build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub module_id: ModuleId,
    pub output_dir: PathBuf,
    /// Same seed and same content yield the same selection.
    pub seed: Option<u64>,
    /// Date printed on the exam; today when `None`.
    pub exam_date: Option<NaiveDate>,
}

impl BuildRequest {
    pub fn new(module_id: ModuleId, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            module_id,
            output_dir: output_dir.into(),
            seed: None,
            exam_date: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_exam_date(mut self, exam_date: NaiveDate) -> Self {
        self.exam_date = Some(exam_date);
        self
    }
}

/// Progress milestones, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStage {
    SelectingTasks,
    TasksSelected { selected: usize, skipped: usize },
    RenderingDocument,
    Compiling,
}

#[derive(Debug)]
pub enum BuildEvent {
    Progress(BuildStage),
    Finished(BuildResult<BuildOutput>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub module_name: String,
    pub artifact: PathBuf,
    pub task_count: usize,
    pub skipped_slots: usize,
}

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug)]
pub enum BuildError {
    Store(DbError),
    Assembly(AssemblyError),
    Render(RenderError),
    Compile(CompileError),
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Worker thread could not start or ended without a result.
    Worker(String),
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "cannot open content store: {err}"),
            Self::Assembly(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "{err}"),
            Self::Compile(err) => write!(f, "{err}"),
            Self::OutputDir { path, source } => write!(
                f,
                "cannot create output directory `{}`: {source}",
                path.display()
            ),
            Self::Worker(message) => write!(f, "build worker failed: {message}"),
        }
    }
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Assembly(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::Compile(err) => Some(err),
            Self::OutputDir { source, .. } => Some(source),
            Self::Worker(_) => None,
        }
    }
}

impl From<DbError> for BuildError {
    fn from(value: DbError) -> Self {
        Self::Store(value)
    }
}

impl From<AssemblyError> for BuildError {
    fn from(value: AssemblyError) -> Self {
        Self::Assembly(value)
    }
}

impl From<RenderError> for BuildError {
    fn from(value: RenderError) -> Self {
        Self::Render(value)
    }
}

impl From<CompileError> for BuildError {
    fn from(value: CompileError) -> Self {
        Self::Compile(value)
    }
}

/// Select → render → compile for one module.
pub struct ExamBuilder<C, K> {
    renderer: DocumentRenderer<C>,
    driver: CompilerDriver<K>,
}

impl<C: MarkupConverter, K: DocumentCompiler> ExamBuilder<C, K> {
    pub fn new(converter: C, compiler: K) -> Self {
        Self {
            renderer: DocumentRenderer::new(converter),
            driver: CompilerDriver::new(compiler),
        }
    }

    /// Runs a full build synchronously, reporting milestones to `progress`.
    ///
    /// The store is only read during selection; render and compile failures
    /// leave it untouched.
    pub fn build<R>(
        &self,
        repo: &R,
        request: &BuildRequest,
        progress: &mut dyn FnMut(BuildStage),
    ) -> BuildResult<BuildOutput>
    where
        R: ContentRepository + ExamConfigRepository,
    {
        let module_id = request.module_id;
        info!("event=exam_build module=build status=start module_id={module_id}");

        let result = self.build_inner(repo, request, progress);
        match &result {
            Ok(output) => info!(
                "event=exam_build module=build status=ok module_id={module_id} tasks={} path={}",
                output.task_count,
                output.artifact.display()
            ),
            Err(err) => error!(
                "event=exam_build module=build status=error module_id={module_id} error={err}"
            ),
        }
        result
    }

    fn build_inner<R>(
        &self,
        repo: &R,
        request: &BuildRequest,
        progress: &mut dyn FnMut(BuildStage),
    ) -> BuildResult<BuildOutput>
    where
        R: ContentRepository + ExamConfigRepository,
    {
        progress(BuildStage::SelectingTasks);
        let mut rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let selection = select_tasks(repo, request.module_id, &mut rng)?;
        progress(BuildStage::TasksSelected {
            selected: selection.tasks.len(),
            skipped: selection.skipped.len(),
        });

        std::fs::create_dir_all(&request.output_dir).map_err(|source| BuildError::OutputDir {
            path: request.output_dir.clone(),
            source,
        })?;
        let base_path = output_base_path(
            &request.output_dir,
            selection.module_id,
            &selection.module_name,
        );
        let exam_date = request
            .exam_date
            .unwrap_or_else(|| Local::now().date_naive());

        progress(BuildStage::RenderingDocument);
        let source = self.renderer.render(
            &selection.module_name,
            &selection.contents(),
            exam_date,
            &base_path,
        )?;

        progress(BuildStage::Compiling);
        let artifact = self.driver.compile(&source)?;

        Ok(BuildOutput {
            module_name: selection.module_name,
            artifact,
            task_count: selection.tasks.len(),
            skipped_slots: selection.skipped.len(),
        })
    }
}

/// `<output_dir>/exam_<module_id>_<sanitized name>` without extension.
pub fn output_base_path(output_dir: &Path, module_id: ModuleId, module_name: &str) -> PathBuf {
    let sanitized = UNSAFE_FILE_CHARS_RE.replace_all(module_name.trim(), "_");
    let stem = sanitized.trim_matches('_');
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };
    output_dir.join(format!("exam_{module_id}_{stem}"))
}
