//! Interaction controllers for the tutor's three tabs.
//!
//! A submission flows `Idle → Validating → Building → Generating → Rendered`,
//! or stops early in `EmptyInputError` / `GenerationError`. The only shared
//! resource is the [`GenerationClient`], which loads the model once and is
//! read-only afterwards.

#![warn(missing_docs, clippy::pedantic)]

mod client;
mod controller;
mod interaction;
pub mod shared;

pub use client::{
    BackendLoader, ClientConfig, GenerationClient, GenerationFailure, GenerationResult, Preloaded,
};
pub use controller::{
    CollectingObserver, ControllerSet, DEFAULT_MAX_LENGTH, GENERIC_FAILURE_MESSAGE,
    InteractionController, Outcome, StatusObserver, TracingStatusObserver,
};
pub use shared::ClientHandle;
pub use interaction::{
    Interaction, InteractionError, InteractionEvent, InteractionResult, InteractionState,
};
