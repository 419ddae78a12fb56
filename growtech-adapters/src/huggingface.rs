//! Hugging Face Inference API backend for `text-generation` models.
//!
//! Defaults to `distilgpt2`. The generated text returned by the API includes
//! the prompt, exactly as the local `transformers` pipeline does.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use hyper::Uri;
use serde::{Deserialize, Serialize};

use crate::http_client::{HyperClient, build_client, post_json, sanitize_base_url};
use crate::traits::{
    AdapterError, AdapterMetadata, AdapterResult, GenerationBackend, GenerationRequest,
};

const PROVIDER: &str = "huggingface";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "distilgpt2";

/// Configuration for the Hugging Face backend.
#[derive(Clone)]
pub struct HuggingFaceConfig {
    base_url: String,
    model: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl fmt::Debug for HuggingFaceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HuggingFaceConfig {
    /// Creates a configuration for the supplied model.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: "https://api-inference.huggingface.co/".to_owned(),
            model: model.into(),
            api_token: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Overrides the API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = sanitize_base_url(base_url.as_ref(), PROVIDER)?;
        Ok(self)
    }

    /// Sets the bearer token sent with each request. Blank tokens are ignored.
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.api_token = (!token.trim().is_empty()).then_some(token);
        self
    }

    /// Sets the HTTP timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

/// Backend that calls the hosted inference API.
pub struct HuggingFaceBackend {
    client: HyperClient,
    endpoint: Uri,
    metadata: AdapterMetadata,
    api_token: Option<String>,
    timeout: Duration,
}

impl fmt::Debug for HuggingFaceBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceBackend")
            .field("model", &self.metadata.model())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HuggingFaceBackend {
    /// Constructs a backend from the supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the model name is blank or the
    /// endpoint is invalid.
    pub fn new(config: HuggingFaceConfig) -> AdapterResult<Self> {
        let model = config.model.trim();
        if model.is_empty() {
            return Err(AdapterError::configuration(
                "Hugging Face model name is empty",
            ));
        }

        let endpoint = format!("{}models/{model}", config.base_url)
            .parse::<Uri>()
            .map_err(|err| {
                AdapterError::configuration(format!("invalid Hugging Face endpoint: {err}"))
            })?;

        Ok(Self {
            client: build_client(),
            endpoint,
            metadata: AdapterMetadata::new(PROVIDER, model),
            api_token: config.api_token,
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl GenerationBackend for HuggingFaceBackend {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn generate(&self, request: GenerationRequest) -> AdapterResult<String> {
        let payload = build_payload(&request);
        let body = serde_json::to_vec(&payload).map_err(|err| {
            AdapterError::invalid_request(format!("failed to encode Hugging Face request: {err}"))
        })?;

        let bytes = post_json(
            &self.client,
            &self.endpoint,
            body,
            self.api_token.as_deref(),
            self.timeout,
            PROVIDER,
        )
        .await?;

        parse_response(&bytes)
    }
}

fn build_payload(request: &GenerationRequest) -> InferencePayload<'_> {
    InferencePayload {
        inputs: request.prompt(),
        parameters: Parameters {
            max_length: request.max_length(),
            num_return_sequences: 1,
            temperature: request.temperature(),
        },
        options: Options {
            wait_for_model: true,
        },
    }
}

fn parse_response(bytes: &[u8]) -> AdapterResult<String> {
    let response: InferenceResponse = serde_json::from_slice(bytes).map_err(|err| {
        AdapterError::response(format!("failed to decode Hugging Face response: {err}"))
    })?;

    match response {
        InferenceResponse::Error { error } => Err(AdapterError::response(error)),
        InferenceResponse::Generations(generations) => generations
            .into_iter()
            .next()
            .map(|generation| generation.generated_text)
            .ok_or_else(|| AdapterError::response("Hugging Face returned no generations")),
    }
}

#[derive(Debug, Serialize)]
struct InferencePayload<'a> {
    inputs: &'a str,
    parameters: Parameters,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Parameters {
    max_length: u32,
    num_return_sequences: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Options {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Generations(Vec<Generation>),
    Error { error: String },
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}
