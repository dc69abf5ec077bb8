//! Core use-case services.
//!
//! # Responsibility
//! - Apply caller-boundary validation on top of repositories.
//! - Keep callers decoupled from storage details.

pub mod content_service;
pub mod exam_config_service;
