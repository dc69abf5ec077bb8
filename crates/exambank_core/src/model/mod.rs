//! Domain model for exam content and exam structure.
//!
//! # Responsibility
//! - Define the records stored by the content store.
//! - Own the pool-order wire format used by exam configurations.
//!
//! # Invariants
//! - Identity is the integer row id assigned by storage, never the name.
//! - Deletes are physical; there are no tombstones.

pub mod content;
pub mod exam_config;
