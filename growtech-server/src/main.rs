//! `growtech` binary: loads configuration and serves the tutor page.

use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use growtech::config::GrowTechConfig;
use growtech::kernel::{ClientConfig, ControllerSet, GenerationClient, TracingStatusObserver, shared};
use growtech::telemetry::tracing_support;
use growtech_server::cli::{Args, resolve_config};
use growtech_server::{AppState, ConfiguredLoader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    tracing_support::init(&config.logging.filter, config.logging.with_target)?;
    info!(generation = ?config.generation, "starting GrowTech");

    let client = shared::get_or_install_with(|| Arc::new(build_client(&config)));
    if args.preload {
        tokio::spawn(async move {
            if let Err(err) = client.preload().await {
                warn!(error = %err, "model preload failed; will retry on first request");
            }
        });
    }

    let controllers = ControllerSet::shared(
        config.generation.max_length,
        Arc::new(TracingStatusObserver),
    );
    let addr = config.server.bind_addr()?;

    let result = growtech_server::run(AppState::new(controllers), addr).await;
    shared::teardown();
    result
}

fn build_client(config: &GrowTechConfig) -> GenerationClient {
    let generation = &config.generation;
    let max_concurrent = NonZeroUsize::new(generation.max_concurrent).unwrap_or(NonZeroUsize::MIN);
    let mut settings = ClientConfig::new(generation.timeout()).with_max_concurrent(max_concurrent);
    if let Some(temperature) = generation.temperature {
        settings = settings.with_temperature(temperature);
    }
    GenerationClient::new(Arc::new(ConfiguredLoader::new(generation.clone())), settings)
}
