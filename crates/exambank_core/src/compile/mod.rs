//! External document compilation.
//!
//! # Responsibility
//! - Reach the typesetting compiler through [`compiler::DocumentCompiler`].
//! - Drive the two-pass compile, verify the artifact and clean up.
//!
//! # Invariants
//! - Success means the artifact exists on disk; exit codes are advisory.
//! - Intermediate files, including the source document, are removed on
//!   every exit path.

pub mod compiler;
pub mod driver;
