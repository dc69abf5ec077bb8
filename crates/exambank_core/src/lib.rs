//! Core of the exam bank: a content store of modules, pools and tasks, plus
//! the pipeline that assembles one exam per module into a compiled document.
//! This crate is the single source of truth for content invariants.

pub mod assembly;
pub mod build;
pub mod compile;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;
pub mod transfer;

pub use assembly::selector::{
    select_tasks, AssemblyError, SelectedTask, Selection, SkipReason, SkippedSlot,
};
pub use build::{
    output_base_path, spawn_build, BuildError, BuildEvent, BuildHandle, BuildOutput,
    BuildRequest, BuildResult, BuildStage, ExamBuilder,
};
pub use compile::compiler::{DocumentCompiler, PdfLatexCompiler};
pub use compile::driver::{CompileError, CompilerDriver};
pub use config::Config;
pub use db::{open_db, open_db_in_memory, DbError, DbResult, Store};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::content::{
    task_preview, AddModuleOutcome, Module, ModuleId, Pool, PoolId, PoolWithModule, Task, TaskId,
};
pub use model::exam_config::{ExamConfig, PoolOrder};
pub use render::converter::{ConverterError, MarkupConverter, PandocConverter};
pub use render::document::{DocumentRenderer, RenderError};
pub use repo::content_repo::{ContentRepository, RepoError, RepoResult, SqliteContentRepository};
pub use repo::exam_config_repo::ExamConfigRepository;
pub use service::content_service::{ContentService, ContentServiceError};
pub use service::exam_config_service::{ConfiguredSlot, ExamConfigService};
pub use transfer::{
    export_to_file, import_file, ConflictDecision, ConflictResolver, ExportSummary,
    ImportOutcome, ImportStats, TransferError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
