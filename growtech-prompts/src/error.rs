use thiserror::Error;

use crate::template::TemplateError;

/// Result alias for prompt building.
pub type PromptResult<T> = Result<T, PromptError>;

/// Errors raised while assembling a prompt.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The request cannot be turned into a prompt (e.g. blank input).
    #[error("invalid prompt request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected.
        reason: String,
    },

    /// The task template could not be rendered.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl PromptError {
    /// Convenience constructor for invalid requests.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }
}
