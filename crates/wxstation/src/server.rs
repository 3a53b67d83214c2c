//! HTTP exposition endpoint.
//!
//! Serves the rendered metrics on `/` and a liveness probe on
//! `/health`. Upstream availability never changes the response status:
//! stale or empty cache states still render as a normal 200.

use crate::cache::ObservationCache;
use crate::metrics;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ObservationCache>,
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = metrics::render(state.cache.get().as_ref());
    ([(header::CONTENT_TYPE, metrics::CONTENT_TYPE)], body)
}

async fn health() -> &'static str {
    "ok"
}

/// Build the exposition router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(metrics_handler))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve until the shutdown channel fires.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: AppState,
    mut shutdown: watch::Receiver<()>,
) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown.changed().await.ok();
            log::info!("HTTP server shutting down...");
        })
        .await
}
