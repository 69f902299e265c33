// HTTP request handlers for server mode
//
// Implements detection ingestion, the dashboard read API and health checks

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use detect2dash_core::{projection, DetectionRow, IngestRequest};
use metrics::counter;
use serde_json::json;
use tracing::debug;

use crate::{AppError, AppState};

/// POST /detections - Detection batch ingestion endpoint
pub(crate) async fn ingest_detections(
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> Result<Response, AppError> {
    counter!("detections.ingest.requests", 1);
    debug!("Received detection batch ({} bytes)", body.len());

    let receipt = IngestRequest::from_slice(&body)
        .and_then(|request| {
            state
                .buffer
                .ingest(request.objects, request.inference_time_ms)
        })
        .map_err(|e| {
            counter!("detections.ingest.rejected", 1);
            AppError::bad_request(e)
        })?;

    counter!("detections.ingest.objects", receipt.object_count as u64);
    if receipt.evicted {
        counter!("detections.buffer.evictions", 1);
    }
    debug!(
        timestamp = %receipt.timestamp,
        objects = receipt.object_count,
        retained = receipt.retained,
        evicted = receipt.evicted,
        "Stored detection batch"
    );

    Ok((StatusCode::OK, Json(json!({"status": "recebido"}))).into_response())
}

/// GET /api/detections - Flattened rows, most recent batch first
pub(crate) async fn list_detections(State(state): State<AppState>) -> Json<Vec<DetectionRow>> {
    Json(projection::list_detections(&state.buffer))
}

/// GET /api/detections/summary - Totals over the retained rows
pub(crate) async fn detections_summary(State(state): State<AppState>) -> impl IntoResponse {
    let rows = projection::list_detections(&state.buffer);
    Json(projection::summarize(&rows))
}

/// DELETE /api/detections - Drop every retained batch
pub(crate) async fn clear_detections(State(state): State<AppState>) -> impl IntoResponse {
    let removed = state.buffer.clear();
    debug!(removed, "Cleared retained detection batches");
    (
        StatusCode::OK,
        Json(json!({"status": "limpo", "removed": removed})),
    )
}

/// GET /health - Basic health check
pub(crate) async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "healthy"})))
}

/// GET /ready - Readiness check
pub(crate) async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ready", "batches": state.buffer.len()})),
    )
}
