//! Exam build pipeline: select, render, compile.
//!
//! # Responsibility
//! - Chain the selector, renderer and compiler driver for one module.
//! - Run builds off the caller's thread and report bounded progress.
//!
//! # Invariants
//! - A build emits zero or more `Progress` events and exactly one
//!   `Finished` event, in that order.
//! - Each worker opens its own store handle.
//! - Output names derive from module identity, so builds of different
//!   modules never share files.
//! - There is no cancellation and no timeout on external tools; a hanging
//!   compiler hangs its worker.

mod pipeline;
mod worker;

pub use pipeline::{
    output_base_path, BuildError, BuildEvent, BuildOutput, BuildRequest, BuildResult, BuildStage,
    ExamBuilder,
};
pub use worker::{spawn_build, BuildHandle};
