//! Browser front end for the GrowTech tutor.
//!
//! Serves one page with the three tabs and a small JSON API the page calls.
//! All behaviour lives in the controllers; this crate only translates HTTP.

#![warn(missing_docs, clippy::pedantic)]

pub mod cli;
pub mod loader;
pub mod routes;
pub mod server;

pub use loader::ConfiguredLoader;
pub use server::{AppState, app, run};
