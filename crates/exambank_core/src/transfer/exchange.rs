//! Export from and import into the content store.

use super::container::{decode_container, encode_container, ExportPayload, ExportedPool};
use super::{TransferError, TransferResult};
use crate::model::content::{AddModuleOutcome, ModuleId, PoolId};
use crate::repo::content_repo::{ContentRepository, RepoError};
use log::{info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Caller's answer for an incoming task whose content already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    /// Leave the existing task alone and continue.
    Skip,
    /// Stop the import now; earlier inserts stay.
    Cancel,
}

/// Decides what to do with a duplicate task. May block, e.g. on a prompt.
pub trait ConflictResolver {
    fn resolve(&mut self, content: &str) -> ConflictDecision;
}

impl<F> ConflictResolver for F
where
    F: FnMut(&str) -> ConflictDecision,
{
    fn resolve(&mut self, content: &str) -> ConflictDecision {
        self(content)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub modules_created: usize,
    pub pools_created: usize,
    pub tasks_added: usize,
    pub tasks_skipped: usize,
}

/// Terminal state of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Completed(ImportStats),
    /// Resolver chose `Cancel`; stats cover what was applied before that.
    Cancelled(ImportStats),
}

impl ImportOutcome {
    pub fn stats(&self) -> ImportStats {
        match self {
            Self::Completed(stats) | Self::Cancelled(stats) => *stats,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub module_name: String,
    pub pool_count: usize,
    pub task_count: usize,
}

/// Collects a module, or just `pool_id` inside it, into a payload.
///
/// # Errors
/// - `ModuleNotFound` when the module does not exist.
/// - `NoPoolsFound` when the module has no pools or `pool_id` is not one.
pub fn export_payload<R: ContentRepository>(
    repo: &R,
    module_id: ModuleId,
    pool_id: Option<PoolId>,
) -> TransferResult<ExportPayload> {
    let module = repo
        .get_module_by_id(module_id)?
        .ok_or(TransferError::ModuleNotFound(module_id))?;

    let pools: Vec<_> = repo
        .get_pools_for_module(module_id)?
        .into_iter()
        .filter(|pool| pool_id.map_or(true, |wanted| pool.id == wanted))
        .collect();

    if pools.is_empty() {
        return Err(TransferError::NoPoolsFound {
            module_name: module.name,
        });
    }

    let mut exported = Vec::with_capacity(pools.len());
    for pool in pools {
        let tasks = repo
            .get_tasks_from_pool(pool.id)?
            .into_iter()
            .map(|task| task.content)
            .collect();
        exported.push(ExportedPool {
            pool_name: pool.name,
            tasks,
        });
    }

    Ok(ExportPayload {
        module_name: module.name,
        pools: exported,
    })
}

/// Exports into a container file at `path`, overwriting it.
pub fn export_to_file<R: ContentRepository>(
    repo: &R,
    module_id: ModuleId,
    pool_id: Option<PoolId>,
    path: &Path,
) -> TransferResult<ExportSummary> {
    let payload = export_payload(repo, module_id, pool_id)?;
    let text = encode_container(&payload)?;
    std::fs::write(path, text).map_err(|source| TransferError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let summary = ExportSummary {
        path: path.to_path_buf(),
        pool_count: payload.pools.len(),
        task_count: payload.task_count(),
        module_name: payload.module_name,
    };
    info!(
        "event=export module=transfer status=ok module_id={module_id} pools={} tasks={} path={}",
        summary.pool_count,
        summary.task_count,
        path.display()
    );
    Ok(summary)
}

/// Reads a container file and imports it.
///
/// The format tag is validated before the store is touched.
pub fn import_file<R, D>(repo: &R, path: &Path, resolver: &mut D) -> TransferResult<ImportOutcome>
where
    R: ContentRepository,
    D: ConflictResolver + ?Sized,
{
    let text = std::fs::read_to_string(path).map_err(|source| TransferError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let payload = decode_container(&text)?;
    import_payload(repo, &payload, resolver)
}

/// Merges a decoded payload into the store.
///
/// Names and task contents are trimmed first; a blank one rejects the whole
/// payload with `InvalidFormat` before anything is written.
pub fn import_payload<R, D>(
    repo: &R,
    payload: &ExportPayload,
    resolver: &mut D,
) -> TransferResult<ImportOutcome>
where
    R: ContentRepository,
    D: ConflictResolver + ?Sized,
{
    let payload = normalized_payload(payload)?;
    let mut stats = ImportStats::default();
    let module_id = resolve_module(repo, &payload.module_name, &mut stats)?;

    for incoming in &payload.pools {
        let pool_id = match repo.find_pool_by_name(module_id, &incoming.pool_name)? {
            Some(pool) => pool.id,
            None => {
                let pool_id = repo.add_pool(&incoming.pool_name, module_id)?;
                stats.pools_created += 1;
                pool_id
            }
        };

        let mut existing: HashSet<String> = repo
            .get_tasks_from_pool(pool_id)?
            .into_iter()
            .map(|task| task.content)
            .collect();

        for content in &incoming.tasks {
            if existing.contains(content) {
                match resolver.resolve(content) {
                    ConflictDecision::Skip => {
                        stats.tasks_skipped += 1;
                        continue;
                    }
                    ConflictDecision::Cancel => {
                        warn!(
                            "event=import module=transfer status=cancelled module_id={module_id} added={} skipped={}",
                            stats.tasks_added, stats.tasks_skipped
                        );
                        return Ok(ImportOutcome::Cancelled(stats));
                    }
                }
            }

            repo.add_task(content, pool_id)?;
            existing.insert(content.clone());
            stats.tasks_added += 1;
        }
    }

    info!(
        "event=import module=transfer status=ok module_id={module_id} modules_created={} pools_created={} tasks_added={} tasks_skipped={}",
        stats.modules_created, stats.pools_created, stats.tasks_added, stats.tasks_skipped
    );
    Ok(ImportOutcome::Completed(stats))
}

fn normalized_payload(payload: &ExportPayload) -> TransferResult<ExportPayload> {
    let module_name = non_blank(&payload.module_name, "module name")?;
    let mut pools = Vec::with_capacity(payload.pools.len());
    for (pool_index, pool) in payload.pools.iter().enumerate() {
        let pool_label = format!("name of pool #{}", pool_index + 1);
        let pool_name = non_blank(&pool.pool_name, &pool_label)?;
        let tasks = pool
            .tasks
            .iter()
            .enumerate()
            .map(|(task_index, content)| {
                non_blank(
                    content,
                    &format!("task #{} in pool `{pool_name}`", task_index + 1),
                )
            })
            .collect::<TransferResult<Vec<_>>>()?;
        pools.push(ExportedPool { pool_name, tasks });
    }
    Ok(ExportPayload { module_name, pools })
}

fn non_blank(value: &str, what: &str) -> TransferResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        warn!(
            "event=import module=transfer status=rejected reason=blank_field field={what:?}"
        );
        return Err(TransferError::InvalidFormat(format!("{what} is blank")));
    }
    Ok(trimmed.to_string())
}

fn resolve_module<R: ContentRepository>(
    repo: &R,
    name: &str,
    stats: &mut ImportStats,
) -> TransferResult<ModuleId> {
    if let Some(module) = repo.find_module_by_name(name)? {
        return Ok(module.id);
    }

    match repo.add_module(name)? {
        AddModuleOutcome::Created(id) => {
            stats.modules_created += 1;
            Ok(id)
        }
        // Another writer created it between lookup and insert.
        AddModuleOutcome::DuplicateName => repo
            .find_module_by_name(name)?
            .map(|module| module.id)
            .ok_or_else(|| {
                RepoError::InvalidData(format!("module `{name}` vanished during import")).into()
            }),
    }
}
