//! Core shared types for the GrowTech tutor.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod ids;
mod task;

/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Identifier attached to a single submission for log correlation.
pub use ids::RequestId;
/// Task kinds, skill levels, and the per-submission request.
pub use task::{SkillLevel, TaskKind, TaskRequest};
