//! Module / pool / task records.
//!
//! # Invariants
//! - Module names are globally unique (exact, case-sensitive).
//! - Pool names carry no uniqueness guarantee; identity is `PoolId`.
//! - Task content is opaque markup text.

pub type ModuleId = i64;
pub type PoolId = i64;
pub type TaskId = i64;

const PREVIEW_MAX_CHARS: usize = 80;

/// Top-level subject grouping that owns pools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
}

/// Named bucket of interchangeable task variants inside one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub id: PoolId,
    pub name: String,
    pub module_id: ModuleId,
}

/// Pool joined with its owning module's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolWithModule {
    pub pool: Pool,
    pub module_name: String,
}

/// One concrete exam question stored as markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub pool_id: PoolId,
    pub content: String,
}

impl Task {
    /// Single-line listing preview, capped at 80 chars.
    pub fn preview(&self) -> String {
        task_preview(&self.content)
    }
}

/// Result of inserting a module under the unique-name rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddModuleOutcome {
    Created(ModuleId),
    /// A module with the same name exists; nothing was written.
    DuplicateName,
}

impl AddModuleOutcome {
    pub fn created_id(self) -> Option<ModuleId> {
        match self {
            Self::Created(id) => Some(id),
            Self::DuplicateName => None,
        }
    }
}

/// Collapses line breaks and truncates markdown for list display.
pub fn task_preview(content: &str) -> String {
    let flattened = content.replace(['\n', '\r'], " ");
    let trimmed = flattened.trim();
    let mut preview: String = trimmed.chars().take(PREVIEW_MAX_CHARS).collect();
    if trimmed.chars().count() > PREVIEW_MAX_CHARS {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::{task_preview, AddModuleOutcome};

    #[test]
    fn preview_flattens_lines() {
        assert_eq!(task_preview("  line1\nline2\r\n"), "line1 line2");
    }

    #[test]
    fn preview_truncates_long_content() {
        let long = "x".repeat(200);
        let preview = task_preview(&long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 83);
    }

    #[test]
    fn duplicate_outcome_has_no_id() {
        assert_eq!(AddModuleOutcome::DuplicateName.created_id(), None);
        assert_eq!(AddModuleOutcome::Created(4).created_id(), Some(4));
    }
}
