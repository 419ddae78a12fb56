//! Text-generation backends used by the tutor.
//!
//! Each module exposes one provider behind the shared
//! [`GenerationBackend`](traits::GenerationBackend) trait defined in [`traits`].

#![warn(missing_docs, clippy::pedantic)]

pub mod huggingface;
pub mod ollama;
pub mod traits;

mod http_client;
