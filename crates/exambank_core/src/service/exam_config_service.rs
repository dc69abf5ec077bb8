//! Exam configuration use-case service.
//!
//! # Responsibility
//! - Save and load the ordered pool sequence of a module.
//! - Resolve configured ids against the module's current pools for display.
//!
//! # Invariants
//! - Any sequence is accepted on save, including empty and repeated ids.
//! - Stale ids are reported, never dropped from storage implicitly.

use crate::model::content::{ModuleId, PoolId};
use crate::model::exam_config::{ExamConfig, PoolOrder};
use crate::repo::content_repo::{ContentRepository, RepoResult};
use crate::repo::exam_config_repo::ExamConfigRepository;
use log::warn;
use std::collections::HashMap;

/// One configured slot resolved against current pools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredSlot {
    pub pool_id: PoolId,
    /// `None` when the pool was deleted or belongs to another module.
    pub pool_name: Option<String>,
}

impl ConfiguredSlot {
    pub fn is_stale(&self) -> bool {
        self.pool_name.is_none()
    }
}

pub struct ExamConfigService<R> {
    repo: R,
}

impl<R: ContentRepository + ExamConfigRepository> ExamConfigService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Replaces the module's pool order. An empty slice is a valid config.
    pub fn save(&self, module_id: ModuleId, pool_ids: &[PoolId]) -> RepoResult<()> {
        if pool_ids.is_empty() {
            warn!(
                "event=exam_config_save module=exam_config_service status=empty module_id={module_id}"
            );
        }
        self.repo
            .save_exam_config(module_id, &PoolOrder::new(pool_ids.to_vec()))
    }

    pub fn load(&self, module_id: ModuleId) -> RepoResult<Option<ExamConfig>> {
        self.repo.get_exam_config_for_module(module_id)
    }

    /// Returns configured slots with pool names, or `None` without a config.
    pub fn resolve(&self, module_id: ModuleId) -> RepoResult<Option<Vec<ConfiguredSlot>>> {
        let Some(config) = self.repo.get_exam_config_for_module(module_id)? else {
            return Ok(None);
        };

        let names: HashMap<PoolId, String> = self
            .repo
            .get_pools_for_module(module_id)?
            .into_iter()
            .map(|pool| (pool.id, pool.name))
            .collect();

        let slots = config
            .pool_order
            .ids()
            .iter()
            .map(|pool_id| ConfiguredSlot {
                pool_id: *pool_id,
                pool_name: names.get(pool_id).cloned(),
            })
            .collect();
        Ok(Some(slots))
    }
}
