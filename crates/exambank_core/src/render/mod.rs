//! Markdown-to-typeset conversion and exam document rendering.
//!
//! # Responsibility
//! - Reach the external markup converter through [`converter::MarkupConverter`].
//! - Produce one intermediate source document per assembly.
//!
//! # Invariants
//! - Any conversion failure aborts the whole render; no partial document is
//!   written.
//! - Rendering never compiles and never touches the content store.

pub mod converter;
pub mod document;
