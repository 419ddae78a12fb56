//! Builds the configured generation backend on first use.

use std::sync::Arc;

use async_trait::async_trait;
use growtech::adapters::huggingface::{HuggingFaceBackend, HuggingFaceConfig};
use growtech::adapters::ollama::{OllamaBackend, OllamaConfig};
use growtech::adapters::traits::{AdapterResult, GenerationBackend};
use growtech::config::{BackendKind, GenerationConfig};
use growtech::kernel::BackendLoader;
use tracing::debug;

/// [`BackendLoader`] driven by the `[generation]` section of the config file.
#[derive(Debug, Clone)]
pub struct ConfiguredLoader {
    config: GenerationConfig,
}

impl ConfiguredLoader {
    /// Wraps validated generation settings.
    #[must_use]
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    fn ollama(&self) -> AdapterResult<OllamaBackend> {
        let mut settings = OllamaConfig::new(self.config.model())
            .with_base_url(self.config.base_url())?
            .with_timeout(self.config.timeout());
        if let Some(temperature) = self.config.temperature {
            settings = settings.with_default_temperature(temperature);
        }
        OllamaBackend::new(settings)
    }

    fn hugging_face(&self) -> AdapterResult<HuggingFaceBackend> {
        let mut settings = HuggingFaceConfig::new(self.config.model())
            .with_base_url(self.config.base_url())?
            .with_timeout(self.config.timeout());
        if let Some(token) = &self.config.api_token {
            settings = settings.with_api_token(token.as_str());
        }
        HuggingFaceBackend::new(settings)
    }
}

#[async_trait]
impl BackendLoader for ConfiguredLoader {
    async fn load(&self) -> AdapterResult<Arc<dyn GenerationBackend>> {
        debug!(backend = %self.config.backend, model = self.config.model(), "constructing backend");
        let backend: Arc<dyn GenerationBackend> = match self.config.backend {
            BackendKind::Ollama => Arc::new(self.ollama()?),
            BackendKind::HuggingFace => Arc::new(self.hugging_face()?),
        };
        Ok(backend)
    }
}
