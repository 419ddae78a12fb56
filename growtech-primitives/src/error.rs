//! Shared error definitions for tutor primitives.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the tutor.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing tutor primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided request identifier could not be parsed.
    #[error("invalid request id: {source}")]
    InvalidRequestId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// The task kind label is not one of `qa`, `debug`, `learning-path`.
    #[error("unknown task kind `{value}`")]
    UnknownTaskKind {
        /// The offending label.
        value: String,
    },

    /// The skill level label is not one of the three supported levels.
    #[error("unknown skill level `{value}`")]
    UnknownSkillLevel {
        /// The offending label.
        value: String,
    },
}
