//! Randomized, duplicate-free task selection.
//!
//! # Responsibility
//! - Walk a module's pool order slot by slot and draw one unused task each.
//!
//! # Invariants
//! - Slots are processed strictly in configured order.
//! - A task id is drawn at most once per assembly, across all slots.
//! - An exhausted, stale or empty pool skips its slot; only a wholly empty
//!   selection is an error.
//! - No state survives between assemblies.

use crate::model::content::{ModuleId, PoolId, TaskId};
use crate::repo::content_repo::{ContentRepository, RepoError};
use crate::repo::exam_config_repo::ExamConfigRepository;
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AssemblyResult<T> = Result<T, AssemblyError>;

#[derive(Debug)]
pub enum AssemblyError {
    ModuleNotFound(ModuleId),
    /// No exam configuration row, or one whose pool order is empty.
    NoConfiguration {
        module_id: ModuleId,
        module_name: String,
        empty_order: bool,
    },
    /// Every slot was skipped.
    NoTasksSelected {
        module_id: ModuleId,
        module_name: String,
    },
    Repo(RepoError),
}

impl Display for AssemblyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModuleNotFound(id) => write!(f, "module not found: {id}"),
            Self::NoConfiguration {
                module_name,
                empty_order: false,
                ..
            } => write!(f, "no exam configuration for module `{module_name}`"),
            Self::NoConfiguration {
                module_name,
                empty_order: true,
                ..
            } => write!(
                f,
                "exam configuration for module `{module_name}` has no pools"
            ),
            Self::NoTasksSelected { module_name, .. } => write!(
                f,
                "no tasks could be selected for module `{module_name}`; all configured pools are empty or exhausted"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AssemblyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AssemblyError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// One filled slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTask {
    pub slot: usize,
    pub pool_id: PoolId,
    pub task_id: TaskId,
    pub content: String,
}

/// Why a slot produced no task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Pool id is unknown or owned by a different module.
    StalePool,
    /// Pool has no task left that was not already drawn.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedSlot {
    pub slot: usize,
    pub pool_id: PoolId,
    pub reason: SkipReason,
}

/// Ordered selection result for one assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub module_id: ModuleId,
    pub module_name: String,
    pub tasks: Vec<SelectedTask>,
    pub skipped: Vec<SkippedSlot>,
}

impl Selection {
    /// Task markup in slot order.
    pub fn contents(&self) -> Vec<&str> {
        self.tasks.iter().map(|task| task.content.as_str()).collect()
    }
}

/// Selects one unused task per configured slot of `module_id`.
///
/// # Errors
/// - `ModuleNotFound` when the module does not exist.
/// - `NoConfiguration` when no config exists or its order is empty.
/// - `NoTasksSelected` when every slot was skipped.
pub fn select_tasks<R, G>(repo: &R, module_id: ModuleId, rng: &mut G) -> AssemblyResult<Selection>
where
    R: ContentRepository + ExamConfigRepository,
    G: Rng + ?Sized,
{
    let module = repo
        .get_module_by_id(module_id)?
        .ok_or(AssemblyError::ModuleNotFound(module_id))?;

    let config = match repo.get_exam_config_for_module(module_id)? {
        Some(config) if !config.pool_order.is_empty() => config,
        other => {
            return Err(AssemblyError::NoConfiguration {
                module_id,
                module_name: module.name,
                empty_order: other.is_some(),
            });
        }
    };

    let owned_pools: HashSet<PoolId> = repo
        .get_pools_for_module(module_id)?
        .into_iter()
        .map(|pool| pool.id)
        .collect();

    info!(
        "event=select_tasks module=selector status=start module_id={module_id} slots={}",
        config.pool_order.len()
    );

    let mut used_task_ids: HashSet<TaskId> = HashSet::new();
    let mut tasks = Vec::new();
    let mut skipped = Vec::new();

    for (slot, &pool_id) in config.pool_order.ids().iter().enumerate() {
        if !owned_pools.contains(&pool_id) {
            warn!(
                "event=select_slot module=selector status=skip reason=stale_pool module_id={module_id} slot={slot} pool_id={pool_id}"
            );
            skipped.push(SkippedSlot {
                slot,
                pool_id,
                reason: SkipReason::StalePool,
            });
            continue;
        }

        let available: Vec<_> = repo
            .get_tasks_from_pool(pool_id)?
            .into_iter()
            .filter(|task| !used_task_ids.contains(&task.id))
            .collect();

        let Some(chosen) = available.choose(rng) else {
            warn!(
                "event=select_slot module=selector status=skip reason=exhausted module_id={module_id} slot={slot} pool_id={pool_id}"
            );
            skipped.push(SkippedSlot {
                slot,
                pool_id,
                reason: SkipReason::Exhausted,
            });
            continue;
        };

        used_task_ids.insert(chosen.id);
        tasks.push(SelectedTask {
            slot,
            pool_id,
            task_id: chosen.id,
            content: chosen.content.clone(),
        });
    }

    if tasks.is_empty() {
        return Err(AssemblyError::NoTasksSelected {
            module_id,
            module_name: module.name,
        });
    }

    info!(
        "event=select_tasks module=selector status=ok module_id={module_id} selected={} skipped={}",
        tasks.len(),
        skipped.len()
    );

    Ok(Selection {
        module_id,
        module_name: module.name,
        tasks,
        skipped,
    })
}
