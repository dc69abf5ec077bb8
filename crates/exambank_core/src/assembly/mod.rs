//! Exam assembly: duplicate-free task selection along a pool order.
//!
//! # See also
//! - `crate::build` for the full select/render/compile pipeline.

pub mod selector;
