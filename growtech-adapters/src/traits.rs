//! Shared backend trait and data structures.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used by generation backends.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Error type shared by backend implementations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Backend is misconfigured (bad URL, missing model name, ...).
    #[error("backend not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// The supplied request was invalid for the target model.
    #[error("invalid generation request: {reason}")]
    InvalidRequest {
        /// Reason describing why the request could not be processed.
        reason: String,
    },

    /// Transport-level failures (network, protocol, timeout).
    #[error("backend transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },

    /// The provider rejected the request due to rate limiting.
    #[error("backend rate limited (retry after {retry_after:?})")]
    RateLimited {
        /// Suggested delay before retrying.
        retry_after: Option<Duration>,
    },

    /// The provider answered with an error or a malformed body.
    #[error("backend response error: {reason}")]
    Response {
        /// Additional context about the response failure.
        reason: String,
    },
}

impl AdapterError {
    /// Convenience constructor for invalid requests.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for response failures.
    #[must_use]
    pub fn response(reason: impl Into<String>) -> Self {
        Self::Response {
            reason: reason.into(),
        }
    }
}

/// Minimal metadata describing a backend instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterMetadata {
    provider: &'static str,
    model: String,
}

impl AdapterMetadata {
    /// Creates metadata for the supplied provider and model identifier.
    #[must_use]
    pub fn new(provider: &'static str, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Returns the provider identifier (e.g., "ollama").
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        self.provider
    }

    /// Returns the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// One prompt-to-text call.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    max_length: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl GenerationRequest {
    /// Creates a request for `prompt` bounded by `max_length` tokens.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidRequest`] if the prompt is empty or the
    /// length budget is zero.
    pub fn new(prompt: impl Into<String>, max_length: u32) -> AdapterResult<Self> {
        let prompt = prompt.into();
        if prompt.is_empty() {
            return Err(AdapterError::invalid_request(
                "generation request requires a prompt",
            ));
        }
        if max_length == 0 {
            return Err(AdapterError::invalid_request(
                "generation request requires a non-zero max_length",
            ));
        }

        Ok(Self {
            prompt,
            max_length,
            temperature: None,
        })
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Returns the prompt text.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the output length budget.
    #[must_use]
    pub const fn max_length(&self) -> u32 {
        self.max_length
    }

    /// Returns the sampling temperature, if any.
    #[must_use]
    pub const fn temperature(&self) -> Option<f32> {
        self.temperature
    }
}

/// Trait implemented by every text-generation backend.
///
/// Implementations must not mutate shared state in [`generate`](Self::generate);
/// the kernel may call it from several sessions at once.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Returns basic metadata describing the backend instance.
    fn metadata(&self) -> &AdapterMetadata;

    /// Prepares the model for use. Called once, before the first generation.
    async fn warm_up(&self) -> AdapterResult<()> {
        Ok(())
    }

    /// Generates text for the request.
    async fn generate(&self, request: GenerationRequest) -> AdapterResult<String>;
}
