//! Per-operation handle factory over one database file.

use super::{open_db, DbError, DbResult};
use log::debug;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Location of the content database.
///
/// `Store` is cheap to clone and safe to move into worker threads; it holds
/// no connection itself. Each [`Store::connect`] call opens an independent
/// handle, so concurrent builds never share cursor state and write-write
/// safety is left to SQLite locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a fresh migrated handle, creating the parent directory on demand.
    pub fn connect(&self) -> DbResult<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| DbError::Directory {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        debug!(
            "event=store_connect module=db status=start path={}",
            self.path.display()
        );
        open_db(&self.path)
    }
}
