//! Module/pool/task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `modules`, `pools` and `tasks`.
//! - Translate constraint failures into semantic repository errors.
//!
//! # Invariants
//! - Duplicate module names are a soft outcome, never an error.
//! - Unknown parent ids on insert surface as `RepoError::MissingParent`.
//! - `update_task` on a missing id reports `false` instead of failing.
//! - Deleting a module or pool removes all descendants in one statement.

use crate::db::DbError;
use crate::model::content::{
    AddModuleOutcome, Module, ModuleId, Pool, PoolId, PoolWithModule, Task, TaskId,
};
use log::info;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for content persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Insert referenced a parent row that does not exist.
    MissingParent { entity: &'static str, id: i64 },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "storage error: {err}"),
            Self::MissingParent { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingParent { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the content hierarchy.
pub trait ContentRepository {
    /// Inserts a module unless the exact name is taken.
    fn add_module(&self, name: &str) -> RepoResult<AddModuleOutcome>;
    fn add_pool(&self, name: &str, module_id: ModuleId) -> RepoResult<PoolId>;
    /// Stores content verbatim.
    fn add_task(&self, content: &str, pool_id: PoolId) -> RepoResult<TaskId>;
    /// Replaces task content; returns whether a row was changed.
    fn update_task(&self, task_id: TaskId, content: &str) -> RepoResult<bool>;
    fn delete_module(&self, module_id: ModuleId) -> RepoResult<()>;
    fn delete_pool(&self, pool_id: PoolId) -> RepoResult<()>;
    fn delete_task(&self, task_id: TaskId) -> RepoResult<()>;
    /// Lists all modules sorted by name.
    fn get_modules(&self) -> RepoResult<Vec<Module>>;
    fn get_module_by_id(&self, module_id: ModuleId) -> RepoResult<Option<Module>>;
    fn find_module_by_name(&self, name: &str) -> RepoResult<Option<Module>>;
    /// Lists pools of one module sorted by name.
    fn get_pools_for_module(&self, module_id: ModuleId) -> RepoResult<Vec<Pool>>;
    /// First pool (lowest id) with the exact name inside one module.
    fn find_pool_by_name(&self, module_id: ModuleId, name: &str) -> RepoResult<Option<Pool>>;
    fn get_pool_with_module_info(&self, pool_id: PoolId) -> RepoResult<Option<PoolWithModule>>;
    /// Lists tasks of one pool in insertion order.
    fn get_tasks_from_pool(&self, pool_id: PoolId) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed content repository.
pub struct SqliteContentRepository<'conn> {
    pub(crate) conn: &'conn Connection,
}

impl<'conn> SqliteContentRepository<'conn> {
    /// Wraps a connection returned by `open_db*` or `Store::connect`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ContentRepository for SqliteContentRepository<'_> {
    fn add_module(&self, name: &str) -> RepoResult<AddModuleOutcome> {
        let changed = self.conn.execute(
            "INSERT INTO modules (name) VALUES (?1)
             ON CONFLICT (name) DO NOTHING;",
            [name],
        )?;

        if changed == 0 {
            info!("event=module_add module=content_repo status=conflict reason=duplicate_name");
            return Ok(AddModuleOutcome::DuplicateName);
        }

        Ok(AddModuleOutcome::Created(self.conn.last_insert_rowid()))
    }

    fn add_pool(&self, name: &str, module_id: ModuleId) -> RepoResult<PoolId> {
        self.conn
            .execute(
                "INSERT INTO pools (name, module_id) VALUES (?1, ?2);",
                params![name, module_id],
            )
            .map_err(|err| map_missing_parent(err, "module", module_id))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn add_task(&self, content: &str, pool_id: PoolId) -> RepoResult<TaskId> {
        self.conn
            .execute(
                "INSERT INTO tasks (content, pool_id) VALUES (?1, ?2);",
                params![content, pool_id],
            )
            .map_err(|err| map_missing_parent(err, "pool", pool_id))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_task(&self, task_id: TaskId, content: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks SET content = ?2 WHERE id = ?1;",
            params![task_id, content],
        )?;
        Ok(changed > 0)
    }

    fn delete_module(&self, module_id: ModuleId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM modules WHERE id = ?1;", [module_id])?;
        info!(
            "event=module_delete module=content_repo status=ok module_id={module_id} changed={changed}"
        );
        Ok(())
    }

    fn delete_pool(&self, pool_id: PoolId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM pools WHERE id = ?1;", [pool_id])?;
        info!(
            "event=pool_delete module=content_repo status=ok pool_id={pool_id} changed={changed}"
        );
        Ok(())
    }

    fn delete_task(&self, task_id: TaskId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [task_id])?;
        Ok(())
    }

    fn get_modules(&self) -> RepoResult<Vec<Module>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM modules ORDER BY name ASC, id ASC;")?;
        let rows = stmt.query_map([], parse_module_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn get_module_by_id(&self, module_id: ModuleId) -> RepoResult<Option<Module>> {
        let module = self
            .conn
            .query_row(
                "SELECT id, name FROM modules WHERE id = ?1;",
                [module_id],
                parse_module_row,
            )
            .optional()?;
        Ok(module)
    }

    fn find_module_by_name(&self, name: &str) -> RepoResult<Option<Module>> {
        let module = self
            .conn
            .query_row(
                "SELECT id, name FROM modules WHERE name = ?1;",
                [name],
                parse_module_row,
            )
            .optional()?;
        Ok(module)
    }

    fn get_pools_for_module(&self, module_id: ModuleId) -> RepoResult<Vec<Pool>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, module_id
             FROM pools
             WHERE module_id = ?1
             ORDER BY name ASC, id ASC;",
        )?;
        let rows = stmt.query_map([module_id], parse_pool_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn find_pool_by_name(&self, module_id: ModuleId, name: &str) -> RepoResult<Option<Pool>> {
        let pool = self
            .conn
            .query_row(
                "SELECT id, name, module_id
                 FROM pools
                 WHERE module_id = ?1 AND name = ?2
                 ORDER BY id ASC
                 LIMIT 1;",
                params![module_id, name],
                parse_pool_row,
            )
            .optional()?;
        Ok(pool)
    }

    fn get_pool_with_module_info(&self, pool_id: PoolId) -> RepoResult<Option<PoolWithModule>> {
        let joined = self
            .conn
            .query_row(
                "SELECT p.id, p.name, p.module_id, m.name AS module_name
                 FROM pools p
                 INNER JOIN modules m ON m.id = p.module_id
                 WHERE p.id = ?1;",
                [pool_id],
                |row| {
                    Ok(PoolWithModule {
                        pool: parse_pool_row(row)?,
                        module_name: row.get("module_name")?,
                    })
                },
            )
            .optional()?;
        Ok(joined)
    }

    fn get_tasks_from_pool(&self, pool_id: PoolId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, pool_id, content
             FROM tasks
             WHERE pool_id = ?1
             ORDER BY id ASC;",
        )?;
        let rows = stmt.query_map([pool_id], |row| {
            Ok(Task {
                id: row.get("id")?,
                pool_id: row.get("pool_id")?,
                content: row.get("content")?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn parse_module_row(row: &Row<'_>) -> rusqlite::Result<Module> {
    Ok(Module {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

fn parse_pool_row(row: &Row<'_>) -> rusqlite::Result<Pool> {
    Ok(Pool {
        id: row.get("id")?,
        name: row.get("name")?,
        module_id: row.get("module_id")?,
    })
}

/// Maps a foreign-key failure on insert to `MissingParent`.
pub(crate) fn map_missing_parent(err: rusqlite::Error, entity: &'static str, id: i64) -> RepoError {
    if is_foreign_key_violation(&err) {
        return RepoError::MissingParent { entity, id };
    }
    err.into()
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
        }
        _ => false,
    }
}
