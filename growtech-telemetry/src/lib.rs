//! Observability utilities for the tutor.

#![warn(missing_docs, clippy::pedantic)]

pub mod tracing_support {
    //! Structured tracing setup.

    use anyhow::{Context, Result};
    use tracing_subscriber::EnvFilter;

    /// Installs the global `fmt` subscriber.
    ///
    /// `RUST_LOG`, when set, wins over `default_filter`.
    ///
    /// # Errors
    ///
    /// Fails if the filter does not parse or a subscriber is already set.
    pub fn init(default_filter: &str, with_target: bool) -> Result<()> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(default_filter)
                .with_context(|| format!("invalid log filter `{default_filter}`"))?,
        };

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(with_target)
            .try_init()
            .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
    }
}

pub mod health {
    //! Health reporting.

    use std::time::Instant;

    use serde::Serialize;

    /// Overall service condition.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
    #[serde(rename_all = "lowercase")]
    pub enum HealthStatus {
        /// Model loaded and serving.
        Ok,
        /// Serving, but the model has not been loaded yet.
        Starting,
    }

    /// Snapshot returned by the health endpoint.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize)]
    pub struct HealthReport {
        /// Overall condition.
        pub status: HealthStatus,
        /// Whether the generation backend is loaded.
        pub backend_loaded: bool,
        /// Provider of the loaded backend.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub provider: Option<String>,
        /// Model of the loaded backend.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub model: Option<String>,
        /// Seconds since start-up.
        pub uptime_secs: u64,
    }

    impl HealthReport {
        /// Builds a report; `backend` carries provider and model once loaded.
        #[must_use]
        pub fn new(started: Instant, backend: Option<(String, String)>) -> Self {
            let backend_loaded = backend.is_some();
            let (provider, model) = backend.unzip();
            Self {
                status: if backend_loaded {
                    HealthStatus::Ok
                } else {
                    HealthStatus::Starting
                },
                backend_loaded,
                provider,
                model,
                uptime_secs: started.elapsed().as_secs(),
            }
        }
    }

}
