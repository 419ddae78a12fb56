//! GrowTech tutor facade.
//!
//! Bundles the tutor crates behind feature flags so an embedding application
//! can pull in only the prompt layer, or the whole controller stack.

#![warn(missing_docs, clippy::pedantic)]

/// Task kinds, skill levels and request identifiers.
pub use growtech_primitives as primitives;

/// Prompt templates (enabled by `prompts` feature).
#[cfg(feature = "prompts")]
pub use growtech_prompts as prompts;

/// Text-generation backends (enabled by `adapters` feature).
#[cfg(feature = "adapters")]
pub use growtech_adapters as adapters;

/// Generation client and tab controllers (enabled by `kernel` feature).
#[cfg(feature = "kernel")]
pub use growtech_kernel as kernel;

/// Configuration file loading (enabled by `config` feature).
#[cfg(feature = "config")]
pub use growtech_config as config;

/// Logging setup and health reporting (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use growtech_telemetry as telemetry;
