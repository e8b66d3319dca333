//! Integration tests for the HTTP API
//!
//! Tests cover:
//! - Assessment submission with fallback and remote analysis
//! - Request validation at the transport boundary
//! - Analysis failure reporting
//! - Results listing with and without a record store
//! - Health and landing page

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use common::*;
use mindscape::analysis::{AnalysisBackend, AnalysisDispatcher, AnalysisError};
use mindscape::models::{AnalysisResult, Profile};
use serde_json::{json, Value};

// =============================================================================
// Assessment submission
// =============================================================================

#[tokio::test]
async fn test_assessment_with_analysis_disabled_uses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("results.json");
    let app = app_from_config(&config_with_log(&log));

    let response = post_json(app, "/assessment", &assessment_body(&["I feel fine", "stable"])).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response).await;
    assert_eq!(body["analysis"]["diagnostic_tags"], json!(["stable_state"]));
    assert_eq!(body["alert"], false);
    assert_eq!(body["alert_reason"], Value::Null);
    assert_eq!(body["image_url"], Value::Null);
    assert_eq!(body["profile"]["name"], "Sora");
    assert!(body["timestamp"].is_string());

    assert_eq!(line_count(&log), 1);
    let line: Value =
        serde_json::from_str(std::fs::read_to_string(&log).unwrap().trim()).unwrap();
    assert_eq!(line["id"], "Sora");
    assert_eq!(line["answers"][2], "x");
    assert_eq!(line["result"]["profile"]["department"], "Operations");
}

#[tokio::test]
async fn test_legacy_assessment_path() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("results.json");
    let app = app_from_config(&config_with_log(&log));

    let response = post_json(app, "/api/process-assessment", &assessment_body(&["ok"])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(line_count(&log), 1);
}

#[tokio::test]
async fn test_remote_analysis_failure_mid_flight_falls_back() {
    let router = Router::new().route(
        "/chat/completions",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
    );
    let llm_url = spawn_mock(router).await;

    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("results.json");
    let mut config = config_with_log(&log);
    config.analysis.api_key = Some("sk-test".to_string());
    config.analysis.base_url = llm_url;
    config.analysis.timeout_seconds = 5;
    let app = app_from_config(&config);

    let response = post_json(app, "/assessment", &assessment_body(&["tired", "busy"])).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response).await;
    assert_eq!(body["analysis"]["diagnostic_tags"], json!(["stable_state"]));
    assert_eq!(body["alert"], false);
    assert_eq!(line_count(&log), 1);
}

#[tokio::test]
async fn test_remote_analysis_alert_propagates() {
    let router = Router::new().route(
        "/chat/completions",
        post(|| async {
            let content = json!({
                "overview": "Signs of exhaustion",
                "characteristics": ["conscientious", "withdrawn"],
                "narrative": "Reports persistent fatigue.",
                "diagnostic_tags": ["fatigue"],
                "alert_indicators": ["persistent insomnia", "social withdrawal"]
            })
            .to_string();
            Json(json!({"choices": [{"message": {"role": "assistant", "content": content}}]}))
        }),
    );
    let llm_url = spawn_mock(router).await;

    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("results.json");
    let mut config = config_with_log(&log);
    config.analysis.api_key = Some("sk-test".to_string());
    config.analysis.base_url = llm_url;
    let app = app_from_config(&config);

    let response = post_json(app, "/assessment", &assessment_body(&["I can't sleep"])).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response).await;
    assert_eq!(body["alert"], true);
    assert_eq!(body["alert_reason"], "persistent insomnia");
    assert_eq!(body["analysis"]["overview"], "Signs of exhaustion");
}

#[tokio::test]
async fn test_store_failure_does_not_fail_request() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("results.json");
    let mut config = config_with_log(&log);
    config.storage.supabase_url = Some(dead_url());
    config.storage.supabase_key = Some("anon".to_string());
    let app = app_from_config(&config);

    let response = post_json(app, "/assessment", &assessment_body(&["fine"])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(line_count(&log), 1);
}

// =============================================================================
// Validation and failures
// =============================================================================

#[tokio::test]
async fn test_missing_field_is_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("results.json");
    let app = app_from_config(&config_with_log(&log));

    let mut body = assessment_body(&["fine"]);
    body.as_object_mut().unwrap().remove("quiet_responses");

    let response = post_json(app, "/assessment", &body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = extract_json(response).await;
    assert_eq!(body["kind"], "validation_error");
    assert!(body["detail"].as_str().unwrap().contains("quiet_responses"));
    assert_eq!(line_count(&log), 0);
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("results.json");
    let app = app_from_config(&config_with_log(&log));

    let response = post_raw(app, "/assessment", "{not json".to_string()).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(extract_json(response).await["kind"], "validation_error");
}

#[tokio::test]
async fn test_wrong_content_type_is_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("results.json");
    let app = app_from_config(&config_with_log(&log));

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/assessment")
        .header("content-type", "text/plain")
        .body(axum::body::Body::from(assessment_body(&["fine"]).to_string()))
        .unwrap();
    let response = tower::util::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(extract_json(response).await["kind"], "validation_error");
    assert_eq!(line_count(&log), 0);
}

struct PanickingBackend;

#[async_trait]
impl AnalysisBackend for PanickingBackend {
    async fn analyze(
        &self,
        _responses: &[String],
        _profile: &Profile,
    ) -> Result<AnalysisResult, AnalysisError> {
        panic!("tokenizer state corrupted")
    }

    fn describe(&self) -> String {
        "panicking".to_string()
    }
}

#[tokio::test]
async fn test_analysis_failure_returns_500_with_detail() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("results.json");
    let dispatcher = AnalysisDispatcher::with_backend(Arc::new(PanickingBackend));
    let app = app_with_dispatcher(dispatcher, &log);

    let response = post_json(app, "/assessment", &assessment_body(&["fine"])).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response).await;
    assert_eq!(body["kind"], "analysis_failed");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("tokenizer state corrupted"));
}

// =============================================================================
// Results listing
// =============================================================================

#[tokio::test]
async fn test_results_without_store() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_from_config(&config_with_log(&dir.path().join("results.json")));

    let response = get_request(app.clone(), "/results").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        extract_json(response).await,
        json!({"error": "store not configured"})
    );

    let legacy = get_request(app, "/api/supabase/results").await;
    assert_eq!(
        extract_json(legacy).await,
        json!({"error": "store not configured"})
    );
}

#[tokio::test]
async fn test_results_with_store() {
    let router = Router::new().route(
        "/rest/v1/diagnostic_results",
        get(|| async {
            Json(json!([
                {"user_id": "Sora", "score_summary": {"q1": 3}, "origin": "mindscape"},
                {"user_id": "Kai", "score_summary": {}, "origin": "mindscape"}
            ]))
        }),
    );
    let store_url = spawn_mock(router).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = config_with_log(&dir.path().join("results.json"));
    config.storage.supabase_url = Some(store_url);
    config.storage.supabase_key = Some("anon".to_string());
    let app = app_from_config(&config);

    let body = extract_json(get_request(app, "/results").await).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][1]["user_id"], "Kai");
}

#[tokio::test]
async fn test_results_with_unreachable_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_with_log(&dir.path().join("results.json"));
    config.storage.supabase_url = Some(dead_url());
    config.storage.supabase_key = Some("anon".to_string());
    let app = app_from_config(&config);

    let response = get_request(app, "/results").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response).await;
    assert!(body["error"].is_string());
    assert!(body.get("status").is_none());
}

// =============================================================================
// Health and landing page
// =============================================================================

#[tokio::test]
async fn test_health_reports_features() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_with_log(&dir.path().join("results.json"));
    config.analysis.api_key = Some("sk-test".to_string());
    config.image.discord_bot_token = Some("token".to_string());
    let app = app_from_config(&config);

    let response = get_request(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "Mindscape Diagnosis Enterprise");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
    assert_eq!(
        body["features"],
        json!({"analysis_enabled": true, "storage_enabled": false, "image_enabled": false})
    );
}

#[tokio::test]
async fn test_landing_page() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_from_config(&config_with_log(&dir.path().join("results.json")));

    let response = get_request(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/health"));
    assert!(html.contains("/results"));
}
