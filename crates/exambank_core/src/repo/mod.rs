//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define data access contracts for content and exam configurations.
//! - Keep SQL details out of selection, rendering and transfer code.
//!
//! # Invariants
//! - Lookups return `Ok(None)` for missing rows; `Err` means storage failure.
//! - Deletes are idempotent and rely on schema cascades for children.

pub mod content_repo;
pub mod exam_config_repo;
