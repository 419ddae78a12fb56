//! `Ollama` backend using the `/api/generate` endpoint.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use hyper::Uri;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http_client::{HyperClient, build_client, post_json, sanitize_base_url};
use crate::traits::{
    AdapterError, AdapterMetadata, AdapterResult, GenerationBackend, GenerationRequest,
};

const PROVIDER: &str = "ollama";

/// Configuration for the `Ollama` backend.
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    base_url: String,
    model: String,
    default_temperature: Option<f32>,
    timeout: Duration,
}

impl OllamaConfig {
    /// Creates a configuration for the supplied model using default settings.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: "http://127.0.0.1:11434/".to_owned(),
            model: model.into(),
            default_temperature: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Overrides the base URL of the local Ollama daemon.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = sanitize_base_url(base_url.as_ref(), PROVIDER)?;
        Ok(self)
    }

    /// Sets the sampling temperature used when the request does not carry one.
    #[must_use]
    pub fn with_default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = Some(temperature);
        self
    }

    /// Sets the HTTP timeout for requests to the daemon.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Backend that calls a local Ollama daemon over HTTP.
pub struct OllamaBackend {
    client: HyperClient,
    endpoint: Uri,
    metadata: AdapterMetadata,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl fmt::Debug for OllamaBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaBackend")
            .field("model", &self.metadata.model())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl OllamaBackend {
    /// Constructs a backend from the supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the model name is blank or the
    /// endpoint is invalid.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(config: OllamaConfig) -> AdapterResult<Self> {
        if config.model.trim().is_empty() {
            return Err(AdapterError::configuration("Ollama model name is empty"));
        }

        let endpoint = format!("{}api/generate", config.base_url)
            .parse::<Uri>()
            .map_err(|err| {
                AdapterError::configuration(format!("invalid Ollama endpoint: {err}"))
            })?;

        Ok(Self {
            client: build_client(),
            endpoint,
            metadata: AdapterMetadata::new(PROVIDER, config.model.clone()),
            timeout: config.timeout,
            default_temperature: config.default_temperature,
        })
    }

    fn build_request<'a>(&'a self, request: &'a GenerationRequest) -> GenerateRequest<'a> {
        GenerateRequest {
            model: self.metadata.model(),
            prompt: Some(request.prompt()),
            stream: false,
            options: Some(GenerateOptions {
                temperature: request.temperature().or(self.default_temperature),
                num_predict: request.max_length(),
            }),
        }
    }

    async fn send(&self, payload: &GenerateRequest<'_>) -> AdapterResult<GenerateResponse> {
        let body = serde_json::to_vec(payload).map_err(|err| {
            AdapterError::invalid_request(format!("failed to encode Ollama request: {err}"))
        })?;

        let bytes = post_json(
            &self.client,
            &self.endpoint,
            body,
            None,
            self.timeout,
            PROVIDER,
        )
        .await?;

        let response: GenerateResponse = serde_json::from_slice(&bytes).map_err(|err| {
            AdapterError::response(format!("failed to decode Ollama response: {err}"))
        })?;

        if let Some(error) = response.error {
            return Err(AdapterError::response(error));
        }
        Ok(response)
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    /// A generate call without a prompt makes the daemon load the model.
    async fn warm_up(&self) -> AdapterResult<()> {
        let payload = GenerateRequest {
            model: self.metadata.model(),
            prompt: None,
            stream: false,
            options: None,
        };
        self.send(&payload).await?;
        debug!(model = self.metadata.model(), "ollama model loaded");
        Ok(())
    }

    async fn generate(&self, request: GenerationRequest) -> AdapterResult<String> {
        let payload = self.build_request(&request);
        let response = self.send(&payload).await?;
        Ok(response.response.unwrap_or_default())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}
