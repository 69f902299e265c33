// Server mode - HTTP relay between a vision pipeline and its dashboard
//
// - Axum HTTP server (HTTP/1.1, HTTP/2)
// - Bounded in-memory retention of detection batches
// - Static serving of the built dashboard bundle
// - Permissive CORS so the dashboard can run from another origin
// - Structured logging with tracing
// - Graceful shutdown

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use detect2dash_config::RuntimeConfig;
use detect2dash_core::RetentionBuffer;
use serde_json::json;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

mod handlers;
mod init;

use handlers::{
    clear_detections, detections_summary, health_check, ingest_detections, list_detections,
    ready_check,
};
pub use init::init_tracing;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    pub buffer: Arc<RetentionBuffer>,
}

impl AppState {
    pub fn new(buffer: Arc<RetentionBuffer>) -> Self {
        Self { buffer }
    }

    /// Fresh, empty buffer sized from configuration.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.retention.capacity)
            .context("retention.capacity must be greater than 0")?;
        Ok(Self::new(Arc::new(RetentionBuffer::new(capacity))))
    }
}

/// Error type that implements IntoResponse
pub(crate) struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request error: {:?}", self.error);
        } else {
            warn!(status = %self.status, "Request rejected: {}", self.error);
        }
        (
            self.status,
            Json(json!({
                "error": self.error.to_string(),
            })),
        )
            .into_response()
    }
}

impl AppError {
    pub fn bad_request<E>(error: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
        }
    }
}

/// Build the full router: API routes, dashboard bundle, CORS and tracing.
pub fn app(config: &RuntimeConfig, state: AppState) -> Router {
    let static_dir = Path::new(&config.frontend.static_dir);
    let index = ServeFile::new(static_dir.join(&config.frontend.index));

    let mut router = Router::new()
        .route("/detections", post(ingest_detections))
        .route(
            "/api/detections",
            get(list_detections).delete(clear_detections),
        )
        .route("/api/detections/summary", get(detections_summary))
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route_service("/", index)
        .fallback_service(ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(config.request.max_payload_bytes))
        .with_state(state);

    if config.frontend.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router.layer(TraceLayer::new_for_http())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

/// Entry point for server mode with pre-loaded configuration (for CLI usage)
pub async fn run_with_config(config: RuntimeConfig) -> Result<()> {
    // Initialize tracing with config
    init_tracing(&config);

    let addr = config.server.listen_addr.clone();
    let state = AppState::from_config(&config)?;
    info!(
        "Retaining the {} most recent detection batches",
        state.buffer.capacity()
    );

    let router = app(&config, state);

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to {}", addr))?;

    info!("Detection relay listening on http://{}", addr);
    info!("Routes:");
    info!("  POST   http://{}/detections              - Detection ingestion", addr);
    info!("  GET    http://{}/api/detections          - Detection rows", addr);
    info!("  GET    http://{}/api/detections/summary  - Detection totals", addr);
    info!("  DELETE http://{}/api/detections          - Clear retained batches", addr);
    info!("  GET    http://{}/health                  - Health check", addr);
    info!("  GET    http://{}/ready                   - Readiness check", addr);
    info!("  GET    http://{}/                        - Dashboard", addr);
    info!("Press Ctrl+C or send SIGTERM to stop");

    // Start server with graceful shutdown
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");

    Ok(())
}
