//! HTTP server for the triage console.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;
use triagekit_client::TriageBackend;
use triagekit_core::DraftMode;

use crate::routes;

/// Application state shared across handlers.
pub struct AppState {
    pub backend: Arc<dyn TriageBackend>,
    /// Reported by `/health`.
    pub backend_url: String,
    /// Draft mode for analyze requests that do not pick one.
    pub default_mode: DraftMode,
}

impl AppState {
    pub fn new(backend: Arc<dyn TriageBackend>, backend_url: String, default_mode: DraftMode) -> Self {
        Self {
            backend,
            backend_url,
            default_mode,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::page_routes())
        .merge(routes::preset_routes())
        .merge(routes::triage_routes())
        .merge(routes::health_routes())
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until the process is stopped.
pub async fn run(state: AppState, addr: SocketAddr) -> Result<()> {
    let backend_url = state.backend_url.clone();
    let mode = state.default_mode;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, backend = %backend_url, %mode, "listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
