//! Content management use-case service.
//!
//! # Responsibility
//! - Validate names and task markup before they reach storage.
//! - Expose the content hierarchy CRUD surface to callers.
//!
//! # Invariants
//! - Module and pool names are trimmed and never blank.
//! - Task content is trimmed and never blank.
//! - Updating a missing task reports `Ok(false)`; deletes never fail on
//!   missing ids.

use crate::model::content::{
    AddModuleOutcome, Module, ModuleId, Pool, PoolId, PoolWithModule, Task, TaskId,
};
use crate::repo::content_repo::{ContentRepository, RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for content use-cases.
#[derive(Debug)]
pub enum ContentServiceError {
    /// Module or pool name is blank after trim.
    InvalidName,
    /// Task markup is blank after trim.
    EmptyTaskContent,
    Repo(RepoError),
}

impl Display for ContentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "name must not be blank"),
            Self::EmptyTaskContent => write!(f, "task content must not be blank"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ContentServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type ContentServiceResult<T> = Result<T, ContentServiceError>;

/// Content service facade over a repository implementation.
pub struct ContentService<R: ContentRepository> {
    repo: R,
}

impl<R: ContentRepository> ContentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Creates a module; a taken name yields `AddModuleOutcome::DuplicateName`.
    pub fn add_module(&self, name: &str) -> ContentServiceResult<AddModuleOutcome> {
        let name = normalize_name(name)?;
        let outcome = self.repo.add_module(name)?;
        match outcome {
            AddModuleOutcome::Created(id) => {
                info!("event=module_add module=content_service status=ok module_id={id}")
            }
            AddModuleOutcome::DuplicateName => {
                warn!("event=module_add module=content_service status=conflict name={name:?}")
            }
        }
        Ok(outcome)
    }

    pub fn add_pool(&self, name: &str, module_id: ModuleId) -> ContentServiceResult<PoolId> {
        let name = normalize_name(name)?;
        let pool_id = self.repo.add_pool(name, module_id)?;
        info!(
            "event=pool_add module=content_service status=ok module_id={module_id} pool_id={pool_id}"
        );
        Ok(pool_id)
    }

    pub fn add_task(&self, content: &str, pool_id: PoolId) -> ContentServiceResult<TaskId> {
        let content = normalize_content(content)?;
        let task_id = self.repo.add_task(content, pool_id)?;
        info!(
            "event=task_add module=content_service status=ok pool_id={pool_id} task_id={task_id}"
        );
        Ok(task_id)
    }

    /// Replaces task markup. Returns `false` when no task has `task_id`.
    pub fn update_task(&self, task_id: TaskId, content: &str) -> ContentServiceResult<bool> {
        let content = normalize_content(content)?;
        let updated = self.repo.update_task(task_id, content)?;
        if !updated {
            warn!("event=task_update module=content_service status=missing task_id={task_id}");
        }
        Ok(updated)
    }

    /// Deletes a module with all pools, tasks and its exam configuration.
    pub fn delete_module(&self, module_id: ModuleId) -> RepoResult<()> {
        self.repo.delete_module(module_id)
    }

    /// Deletes a pool with all of its tasks.
    pub fn delete_pool(&self, pool_id: PoolId) -> RepoResult<()> {
        self.repo.delete_pool(pool_id)
    }

    pub fn delete_task(&self, task_id: TaskId) -> RepoResult<()> {
        self.repo.delete_task(task_id)
    }

    pub fn list_modules(&self) -> RepoResult<Vec<Module>> {
        self.repo.get_modules()
    }

    pub fn get_module(&self, module_id: ModuleId) -> RepoResult<Option<Module>> {
        self.repo.get_module_by_id(module_id)
    }

    pub fn list_pools(&self, module_id: ModuleId) -> RepoResult<Vec<Pool>> {
        self.repo.get_pools_for_module(module_id)
    }

    pub fn get_pool(&self, pool_id: PoolId) -> RepoResult<Option<PoolWithModule>> {
        self.repo.get_pool_with_module_info(pool_id)
    }

    pub fn list_tasks(&self, pool_id: PoolId) -> RepoResult<Vec<Task>> {
        self.repo.get_tasks_from_pool(pool_id)
    }
}

fn normalize_name(name: &str) -> ContentServiceResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ContentServiceError::InvalidName);
    }
    Ok(trimmed)
}

fn normalize_content(content: &str) -> ContentServiceResult<&str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ContentServiceError::EmptyTaskContent);
    }
    Ok(trimmed)
}
