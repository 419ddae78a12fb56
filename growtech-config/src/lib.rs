//! Configuration for the tutor.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working setup that talks to a local Ollama daemon.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{from_toml_str, load};
pub use schema::{
    BackendKind, GenerationConfig, GrowTechConfig, LoggingConfig, MAX_CONCURRENT_LIMIT,
    ServerConfig,
};
