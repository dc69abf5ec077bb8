//! Exam configuration persistence.
//!
//! # Invariants
//! - At most one row per module (`module_id UNIQUE`).
//! - Saving is an upsert: the row id survives, `pool_order` is replaced.
//! - Rows disappear with their module through the schema cascade.

use crate::model::content::ModuleId;
use crate::model::exam_config::{ExamConfig, PoolOrder};
use crate::repo::content_repo::{map_missing_parent, RepoResult, SqliteContentRepository};
use log::info;
use rusqlite::{params, OptionalExtension};

/// Repository interface for per-module exam structure.
pub trait ExamConfigRepository {
    fn get_exam_config_for_module(&self, module_id: ModuleId) -> RepoResult<Option<ExamConfig>>;
    /// Inserts or replaces the pool order for one module.
    fn save_exam_config(&self, module_id: ModuleId, pool_order: &PoolOrder) -> RepoResult<()>;
}

impl ExamConfigRepository for SqliteContentRepository<'_> {
    fn get_exam_config_for_module(&self, module_id: ModuleId) -> RepoResult<Option<ExamConfig>> {
        let config = self
            .conn
            .query_row(
                "SELECT id, module_id, pool_order FROM exam_configs WHERE module_id = ?1;",
                [module_id],
                |row| {
                    let raw: String = row.get("pool_order")?;
                    Ok(ExamConfig {
                        id: row.get("id")?,
                        module_id: row.get("module_id")?,
                        pool_order: PoolOrder::decode(&raw),
                    })
                },
            )
            .optional()?;
        Ok(config)
    }

    fn save_exam_config(&self, module_id: ModuleId, pool_order: &PoolOrder) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO exam_configs (module_id, pool_order) VALUES (?1, ?2)
                 ON CONFLICT (module_id) DO UPDATE SET pool_order = excluded.pool_order;",
                params![module_id, pool_order.encode()],
            )
            .map_err(|err| map_missing_parent(err, "module", module_id))?;
        info!(
            "event=exam_config_save module=exam_config_repo status=ok module_id={module_id} slots={}",
            pool_order.len()
        );
        Ok(())
    }
}
