//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::path::Path;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use mindscape::analysis::AnalysisDispatcher;
use mindscape::api::FeatureFlags;
use mindscape::assessment::AssessmentService;
use mindscape::config::{Config, StorageConfig};
use mindscape::storage::ResultSink;
use mindscape::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL that refuses connections.
pub fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Config writing the results log to `log` with every integration off.
pub fn config_with_log(log: &Path) -> Config {
    Config {
        storage: StorageConfig {
            results_log: log.to_path_buf(),
            timeout_seconds: 5,
            ..StorageConfig::default()
        },
        ..Config::default()
    }
}

/// App built the same way `main` builds it.
pub fn app_from_config(config: &Config) -> Router {
    build_router(AppState::from_config(config))
}

/// App with an explicit dispatcher and a local-only sink.
pub fn app_with_dispatcher(dispatcher: AnalysisDispatcher, log: &Path) -> Router {
    let sink = ResultSink::from_config(&config_with_log(log).storage);
    let state = AppState::new(
        AssessmentService::new(dispatcher, sink),
        FeatureFlags::default(),
        "Mindscape Test",
    );
    build_router(state)
}

pub fn assessment_body(quiet_responses: &[&str]) -> Value {
    json!({
        "profile": {"name": "Sora", "age": 38, "department": "Operations"},
        "answers": ["3", "4", "x", "2", "1", "5", "2", "3", "4", "1"],
        "timestamp": "2024-05-01T09:00:00Z",
        "department_questions": ["How manageable is your workload?"],
        "quiet_responses": quiet_responses,
        "heart_landscape": "a calm sea at dawn"
    })
}

pub async fn get_request(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: String) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

pub fn line_count(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .map(|content| content.lines().count())
        .unwrap_or(0)
}
