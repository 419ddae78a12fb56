//! Strongly typed configuration schema.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Largest accepted `generation.max_concurrent`.
pub const MAX_CONCURRENT_LIMIT: usize = 1024;

/// Root of the configuration file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GrowTechConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Generation backend settings.
    pub generation: GenerationConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

impl GrowTechConfig {
    /// Checks value ranges that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.bind_addr()?;

        let generation = &self.generation;
        if generation.max_length == 0 {
            return Err(ConfigError::invalid(
                "generation.max_length",
                "must be greater than zero",
            ));
        }
        if generation.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "generation.timeout_secs",
                "must be greater than zero",
            ));
        }
        if generation.max_concurrent == 0 {
            return Err(ConfigError::invalid(
                "generation.max_concurrent",
                "must be greater than zero",
            ));
        }
        if generation.max_concurrent > MAX_CONCURRENT_LIMIT {
            return Err(ConfigError::invalid(
                "generation.max_concurrent",
                format!("must be at most {MAX_CONCURRENT_LIMIT}"),
            ));
        }
        if let Some(temperature) = generation.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::invalid(
                    "generation.temperature",
                    format!("{temperature} is outside 0.0..=2.0"),
                ));
            }
        }
        if generation.model().trim().is_empty() {
            return Err(ConfigError::invalid("generation.model", "must not be blank"));
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the page is served on.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_owned(),
        }
    }
}

impl ServerConfig {
    /// Parses the bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `bind` is not `host:port`.
    pub fn bind_addr(&self) -> ConfigResult<SocketAddr> {
        self.bind
            .trim()
            .parse()
            .map_err(|err| ConfigError::invalid("server.bind", format!("{}: {err}", self.bind)))
    }
}

/// Which text-generation service to call.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local Ollama daemon.
    #[default]
    Ollama,
    /// Hugging Face Inference API.
    #[serde(alias = "hf", alias = "hugging-face")]
    HuggingFace,
}

impl BackendKind {
    /// Model used when the file does not name one.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Ollama => "gemma2:2b",
            Self::HuggingFace => "distilgpt2",
        }
    }

    /// Base URL used when the file does not name one.
    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Ollama => "http://127.0.0.1:11434/",
            Self::HuggingFace => "https://api-inference.huggingface.co/",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ollama => "ollama",
            Self::HuggingFace => "huggingface",
        })
    }
}

/// Generation backend settings.
#[derive(Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Service to call.
    pub backend: BackendKind,
    /// Model name; backend default when absent.
    pub model: Option<String>,
    /// Service URL; backend default when absent.
    pub base_url: Option<String>,
    /// Bearer token for hosted APIs.
    pub api_token: Option<String>,
    /// Output budget applied to every task.
    pub max_length: u32,
    /// Upper bound on a single generation, in seconds.
    pub timeout_secs: u64,
    /// Generations allowed to run at once; `1` serialises them.
    pub max_concurrent: usize,
    /// Sampling temperature forwarded to the model.
    pub temperature: Option<f32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            model: None,
            base_url: None,
            api_token: None,
            max_length: 300,
            timeout_secs: 120,
            max_concurrent: 1,
            temperature: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("backend", &self.backend)
            .field("model", &self.model())
            .field("base_url", &self.base_url())
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("max_length", &self.max_length)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_concurrent", &self.max_concurrent)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GenerationConfig {
    /// Effective model name.
    #[must_use]
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }

    /// Effective service URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.backend.default_base_url())
    }

    /// Per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Log output settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `growtech_kernel=debug`.
    pub filter: String,
    /// Include the event target in each line.
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            with_target: false,
        }
    }
}
