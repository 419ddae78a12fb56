//! Prompt assembly for the tutor.
//!
//! [`PromptBuilder`] turns a [`TaskRequest`](growtech_primitives::TaskRequest)
//! into the exact string handed to the generation model. Rendering is pure:
//! the same request and template version always produce the same bytes.

#![warn(missing_docs, clippy::pedantic)]

mod builder;
mod error;
pub mod template;

pub use builder::{DEBUG_TEMPLATE, LEARNING_PATH_TEMPLATE, Prompt, PromptBuilder, TUTOR_PREAMBLE};
pub use error::{PromptError, PromptResult};
pub use template::{PromptTemplate, TemplateError, TemplateResult};
