//! Portable export/import of module subtrees.
//!
//! # Responsibility
//! - Encode a module (or one of its pools) into a text container file.
//! - Rebuild content from such a file, resolving duplicates by name and by
//!   task content.
//!
//! # Invariants
//! - The container's format tag is checked before anything is decoded or
//!   written to the store.
//! - Import matches modules and pools by exact name; tasks by exact content.
//! - A cancelled import keeps whatever it already created. Each insert is
//!   atomic on its own; the import as a whole is not.

pub mod container;
pub mod exchange;

use crate::model::content::ModuleId;
use crate::repo::content_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub use container::{
    decode_container, encode_container, ExportPayload, ExportedPool, CONTAINER_FORMAT,
    CONTAINER_VERSION,
};
pub use exchange::{
    export_payload, export_to_file, import_file, import_payload, ConflictDecision,
    ConflictResolver, ExportSummary, ImportOutcome, ImportStats,
};

pub type TransferResult<T> = Result<T, TransferError>;

#[derive(Debug)]
pub enum TransferError {
    ModuleNotFound(ModuleId),
    NoPoolsFound {
        module_name: String,
    },
    /// Container is not JSON or carries an unknown format tag.
    InvalidFormat(String),
    /// Payload could not be base64- or bitcode-decoded.
    Decode(String),
    Encode(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Repo(RepoError),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModuleNotFound(id) => write!(f, "module not found: {id}"),
            Self::NoPoolsFound { module_name } => {
                write!(f, "no pools to export for module `{module_name}`")
            }
            Self::InvalidFormat(message) => write!(f, "invalid export file: {message}"),
            Self::Decode(message) => write!(f, "cannot decode export payload: {message}"),
            Self::Encode(message) => write!(f, "cannot encode export payload: {message}"),
            Self::Io { path, source } => write!(f, "cannot access `{}`: {source}", path.display()),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TransferError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
