//! HTTP server wiring.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::Router;
use growtech::kernel::ControllerSet;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::routes;

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    /// One controller per tab.
    pub controllers: ControllerSet,
    /// When the server started, for the health report.
    pub start_time: Instant,
}

impl AppState {
    /// Creates state around an already configured controller set.
    #[must_use]
    pub fn new(controllers: ControllerSet) -> Self {
        Self {
            controllers,
            start_time: Instant::now(),
        }
    }
}

/// Builds the router without binding a socket.
#[must_use]
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::page_routes())
        .merge(routes::task_routes())
        .merge(routes::feedback_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serves until Ctrl-C, then stops the generation client.
///
/// # Errors
///
/// Fails if the address cannot be bound or the server stops unexpectedly.
pub async fn run(state: AppState, addr: SocketAddr) -> Result<()> {
    let state = Arc::new(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("GrowTech listening on http://{addr}");

    axum::serve(listener, app(Arc::clone(&state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(client) = state.controllers.client() {
        client.shutdown();
    }
    info!("GrowTech stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => warn!(error = %err, "failed to listen for Ctrl-C; shutting down"),
    }
}
