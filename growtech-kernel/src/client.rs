//! Lazily loaded, process-wide generation client.

use std::fmt;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use growtech_adapters::traits::{
    AdapterError, AdapterMetadata, AdapterResult, GenerationBackend, GenerationRequest,
};
use thiserror::Error;
use tokio::sync::{OnceCell, Semaphore};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info};

/// Produces the backend the first time a generation is requested.
#[async_trait]
pub trait BackendLoader: Send + Sync {
    /// Constructs (but does not warm up) the backend.
    async fn load(&self) -> AdapterResult<Arc<dyn GenerationBackend>>;
}

/// Loader that hands out a backend that already exists.
///
/// Mostly useful in tests, where a fake backend stands in for a real model.
pub struct Preloaded(Arc<dyn GenerationBackend>);

impl Preloaded {
    /// Wraps an existing backend.
    #[must_use]
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self(backend)
    }
}

#[async_trait]
impl BackendLoader for Preloaded {
    async fn load(&self) -> AdapterResult<Arc<dyn GenerationBackend>> {
        Ok(Arc::clone(&self.0))
    }
}

/// Tuning knobs for [`GenerationClient`].
#[derive(Debug, Clone, Copy)]
pub struct ClientConfig {
    max_concurrent: NonZeroUsize,
    timeout: Duration,
    temperature: Option<f32>,
}

impl ClientConfig {
    /// Creates a configuration that serialises calls and waits up to `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            max_concurrent: NonZeroUsize::MIN,
            timeout,
            temperature: None,
        }
    }

    /// Allows up to `max_concurrent` generations to run at once.
    #[must_use]
    pub const fn with_max_concurrent(mut self, max_concurrent: NonZeroUsize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Sets the sampling temperature forwarded to the backend.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Returns the concurrency limit.
    #[must_use]
    pub const fn max_concurrent(self) -> NonZeroUsize {
        self.max_concurrent
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub const fn timeout(self) -> Duration {
        self.timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(120))
    }
}

/// Reasons a generation call did not produce text.
///
/// The user never sees these; the controller logs them and shows a generic
/// message instead.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    /// The backend could not be constructed or warmed up.
    #[error("failed to load generation backend: {source}")]
    Load {
        /// Underlying backend error.
        source: AdapterError,
    },

    /// The backend rejected or failed the call.
    #[error("generation failed: {source}")]
    Backend {
        /// Underlying backend error.
        #[from]
        source: AdapterError,
    },

    /// The call did not finish in time.
    #[error("generation timed out after {after:?}")]
    Timeout {
        /// The configured limit.
        after: Duration,
    },

    /// The backend returned nothing but whitespace.
    #[error("generation returned no text")]
    EmptyOutput,

    /// The backend panicked while generating.
    #[error("generation backend panicked")]
    Panicked,

    /// The client was shut down.
    #[error("generation client is shut down")]
    ShutDown,
}

/// Result alias for generation calls.
pub type GenerationResult<T> = Result<T, GenerationFailure>;

type BackendCell = Arc<OnceCell<Arc<dyn GenerationBackend>>>;

/// Wraps the one external capability: prompt in, text out.
///
/// The backend is loaded on first use and kept until [`unload`](Self::unload).
/// Concurrent first calls share a single load. Calls are bounded by a
/// semaphore; with one permit they are fully serialised.
pub struct GenerationClient {
    loader: Arc<dyn BackendLoader>,
    backend: RwLock<BackendCell>,
    permits: Semaphore,
    config: ClientConfig,
}

impl fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationClient")
            .field("loaded", &self.is_loaded())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GenerationClient {
    /// Creates a client that will load its backend through `loader`.
    #[must_use]
    pub fn new(loader: Arc<dyn BackendLoader>, config: ClientConfig) -> Self {
        Self {
            loader,
            backend: RwLock::new(Arc::default()),
            permits: Semaphore::new(config.max_concurrent().get().min(Semaphore::MAX_PERMITS)),
            config,
        }
    }

    /// Creates a client around a backend that is already constructed.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn GenerationBackend>, config: ClientConfig) -> Self {
        Self::new(Arc::new(Preloaded::new(backend)), config)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> ClientConfig {
        self.config
    }

    /// Returns `true` once the backend has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cell().initialized()
    }

    /// Returns metadata for the loaded backend, if any.
    #[must_use]
    pub fn metadata(&self) -> Option<AdapterMetadata> {
        self.cell().get().map(|backend| backend.metadata().clone())
    }

    /// Drops the cached backend so the next call loads it again.
    ///
    /// Calls already holding the old backend finish with it.
    pub fn unload(&self) -> Option<Arc<dyn GenerationBackend>> {
        let mut slot = self.backend.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::take(&mut *slot);
        previous.get().map(Arc::clone)
    }

    /// Stops accepting new calls. Calls already running finish normally.
    pub fn shutdown(&self) {
        self.permits.close();
    }

    /// Loads the backend now instead of on the first call.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationFailure::Load`] or [`GenerationFailure::Timeout`].
    pub async fn preload(&self) -> GenerationResult<()> {
        let deadline = Instant::now() + self.config.timeout;
        self.backend(deadline).await.map(|_| ())
    }

    /// Generates text for `prompt`, bounded by `max_length` tokens.
    ///
    /// Blocks the caller until the backend answers, fails, or the configured
    /// timeout elapses. The timeout covers loading the backend as well as the
    /// call itself. There are no retries.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationFailure`] describing why no text was produced.
    pub async fn generate(&self, prompt: &str, max_length: u32) -> GenerationResult<String> {
        let mut request = GenerationRequest::new(prompt, max_length)?;
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }

        let limit = self.config.timeout;
        let deadline = Instant::now() + limit;
        let backend = self.backend(deadline).await?;

        let call = async {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| GenerationFailure::ShutDown)?;
            AssertUnwindSafe(backend.generate(request))
                .catch_unwind()
                .await
                .map_err(|_| GenerationFailure::Panicked)?
                .map_err(GenerationFailure::from)
        };

        let text = timeout_at(deadline, call)
            .await
            .map_err(|_| GenerationFailure::Timeout { after: limit })??;

        if text.trim().is_empty() {
            return Err(GenerationFailure::EmptyOutput);
        }
        debug!(chars = text.chars().count(), "generation complete");
        Ok(text)
    }

    fn cell(&self) -> BackendCell {
        Arc::clone(&self.backend.read().unwrap_or_else(PoisonError::into_inner))
    }

    async fn backend(&self, deadline: Instant) -> GenerationResult<Arc<dyn GenerationBackend>> {
        let limit = self.config.timeout;
        let cell = self.cell();
        let load = cell.get_or_try_init(|| async {
            info!("loading generation backend");
            let backend = self.loader.load().await?;
            backend.warm_up().await?;
            let metadata = backend.metadata();
            info!(
                provider = metadata.provider(),
                model = metadata.model(),
                "generation backend ready"
            );
            Ok::<_, AdapterError>(backend)
        });

        timeout_at(deadline, load)
            .await
            .map_err(|_| GenerationFailure::Timeout { after: limit })?
            .map(Arc::clone)
            .map_err(|source| GenerationFailure::Load { source })
    }
}
