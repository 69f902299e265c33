// End-to-end tests for the HTTP surface
//
// Requests are driven through the router in-process; the dashboard bundle
// lives in a temporary directory.

use std::fs;
use std::num::NonZeroUsize;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use detect2dash::{app, AppState};
use detect2dash_config::RuntimeConfig;
use detect2dash_core::RetentionBuffer;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    buffer: Arc<RetentionBuffer>,
    _static_dir: TempDir,
}

fn test_app(capacity: usize) -> TestApp {
    let static_dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(
        static_dir.path().join("index.html"),
        "<!doctype html><title>Painel</title>",
    )
    .expect("Failed to write index.html");
    fs::create_dir(static_dir.path().join("_next")).expect("Failed to create asset dir");
    fs::write(static_dir.path().join("_next/app.js"), "console.log('painel')")
        .expect("Failed to write asset");

    let mut config = RuntimeConfig::default();
    config.frontend.static_dir = static_dir.path().to_string_lossy().to_string();
    config.retention.capacity = capacity;

    let buffer = Arc::new(RetentionBuffer::new(NonZeroUsize::new(capacity).unwrap()));
    let router = app(&config, AppState::new(Arc::clone(&buffer)));

    TestApp {
        router,
        buffer,
        _static_dir: static_dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("Router failed");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    (status, body.to_vec())
}

async fn post_json(router: &Router, path: &str, payload: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).expect("Response is not JSON"))
}

async fn get_json(router: &Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    let (status, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).expect("Response is not JSON"))
}

#[tokio::test]
async fn test_ingest_then_list() {
    let app = test_app(20);

    let (status, body) = post_json(
        &app.router,
        "/detections",
        &json!({"objetos": [{"classe": "frasco_avaria"}], "tempo_ms": 42}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "recebido"}));

    let (status, rows) = get_json(&app.router, "/api/detections").await;
    assert_eq!(status, StatusCode::OK);

    let rows = rows.as_array().expect("Expected an array");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["id"], "0-frasco_avaria");
    assert_eq!(row["classe"], "frasco_avaria");
    assert_eq!(row["categoria"], "Frasco");
    assert_eq!(row["correto"], false);
    assert_eq!(row["tempoInferencia"], 42);

    let timestamp = row["timestamp"].as_str().unwrap();
    assert_eq!(timestamp.len(), "2024-01-01T10:00:00".len());
    assert_eq!(&timestamp[10..11], "T");
}

#[tokio::test]
async fn test_empty_list() {
    let app = test_app(20);
    let (status, rows) = get_json(&app.router, "/api/detections").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows, json!([]));
}

#[tokio::test]
async fn test_incomplete_payloads_rejected() {
    let app = test_app(20);

    let payloads = [
        json!({"objetos": [], "tempo_ms": 10}),
        json!({"objetos": [{"classe": "caixa"}]}),
        json!({"objetos": [{"classe": "caixa"}], "tempo_ms": null}),
        json!({"tempo_ms": 10}),
        json!({"objetos": [{"nome": "caixa"}], "tempo_ms": 10}),
    ];

    for payload in &payloads {
        let (status, body) = post_json(&app.router, "/detections", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body, json!({"error": "Dados incompletos"}));
    }

    assert!(app.buffer.is_empty());
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let app = test_app(20);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/detections")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].is_string());
    assert!(app.buffer.is_empty());
}

#[tokio::test]
async fn test_retention_bound_over_http() {
    let app = test_app(20);

    for i in 0..25 {
        let (status, _) = post_json(
            &app.router,
            "/detections",
            &json!({"objetos": [{"classe": format!("caixa_{}", i)}], "tempo_ms": i}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(app.buffer.len(), (i + 1).min(20));
    }

    let (_, rows) = get_json(&app.router, "/api/detections").await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0]["classe"], "caixa_24");
    assert_eq!(rows[0]["id"], "0-caixa_24");
    assert_eq!(rows[19]["classe"], "caixa_5");
    assert_eq!(rows[19]["id"], "19-caixa_5");
}

#[tokio::test]
async fn test_multi_object_batch_rows() {
    let app = test_app(20);
    post_json(
        &app.router,
        "/detections",
        &json!({
            "objetos": [
                {"classe": "blister_avaria", "confianca": 0.8},
                {"classe": "caixa"},
                {"classe": "widget"}
            ],
            "tempo_ms": 17.5
        }),
    )
    .await;

    let (_, rows) = get_json(&app.router, "/api/detections").await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);

    let categories: Vec<&str> = rows
        .iter()
        .map(|r| r["categoria"].as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["Blister", "Caixa", "Unknown"]);

    let correct: Vec<bool> = rows.iter().map(|r| r["correto"].as_bool().unwrap()).collect();
    assert_eq!(correct, vec![false, true, true]);

    assert!(rows.iter().all(|r| r["tempoInferencia"] == json!(17.5)));
}

#[tokio::test]
async fn test_summary_and_clear() {
    let app = test_app(20);
    post_json(
        &app.router,
        "/detections",
        &json!({"objetos": [{"classe": "frasco"}, {"classe": "frasco_avaria"}], "tempo_ms": 20}),
    )
    .await;

    let (status, summary) = get_json(&app.router, "/api/detections/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["corretos"], 1);
    assert_eq!(summary["defeituosos"], 1);
    assert_eq!(summary["tempoMedio"], 20.0);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/detections")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({"status": "limpo", "removed": 1}));

    let (_, rows) = get_json(&app.router, "/api/detections").await;
    assert_eq!(rows, json!([]));
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = test_app(20);

    let (status, body) = get_json(&app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get_json(&app.router, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["batches"], 0);
}

#[tokio::test]
async fn test_serves_dashboard_bundle() {
    let app = test_app(20);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("Painel"));

    let request = Request::builder()
        .uri("/_next/app.js")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"console.log('painel')");

    let request = Request::builder()
        .uri("/missing.css")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = test_app(20);

    let request = Request::builder()
        .uri("/api/detections")
        .header(header::ORIGIN, "http://192.168.15.109:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/detections")
        .header(header::ORIGIN, "http://dashboard.local")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(preflight).await.unwrap();
    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_oversized_payload_rejected() {
    let static_dir = tempfile::tempdir().unwrap();
    let mut config = RuntimeConfig::default();
    config.frontend.static_dir = static_dir.path().to_string_lossy().to_string();
    config.request.max_payload_bytes = 64;

    let state = AppState::from_config(&config).unwrap();
    let buffer = Arc::clone(&state.buffer);
    let router = app(&config, state);

    let objects: Vec<Value> = (0..20).map(|_| json!({"classe": "caixa"})).collect();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/detections")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"objetos": objects, "tempo_ms": 1}).to_string()))
        .unwrap();

    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(buffer.is_empty());
}
