//! Mindscape - assessment submission service
//!
//! Accepts psychological-assessment submissions over HTTP, analyzes the
//! free-text answers with a language model (or a fixed fallback) and records
//! every result to a local JSON-lines log and an optional Supabase table.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod analysis;
pub mod api;
pub mod assessment;
pub mod cli;
pub mod config;
pub mod models;
pub mod storage;

#[cfg(test)]
mod test_support;

use analysis::AnalysisDispatcher;
use api::FeatureFlags;
use assessment::AssessmentService;
use config::Config;
use storage::ResultSink;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The submission pipeline
    pub service: Arc<AssessmentService>,
    /// Integrations reported by the health endpoint
    pub features: FeatureFlags,
    /// Service name reported by the health endpoint
    pub service_name: Arc<str>,
}

impl AppState {
    /// Create new application state
    pub fn new(service: AssessmentService, features: FeatureFlags, service_name: &str) -> Self {
        Self {
            service: Arc::new(service),
            features,
            service_name: Arc::from(service_name),
        }
    }

    /// Wire the dispatcher, sink and feature flags from configuration.
    pub fn from_config(config: &Config) -> Self {
        let dispatcher = AnalysisDispatcher::from_config(&config.analysis);
        let sink = ResultSink::from_config(&config.storage);

        let features = FeatureFlags {
            analysis_enabled: dispatcher.is_remote(),
            storage_enabled: sink.remote().is_some(),
            image_enabled: config.image.is_enabled(),
        };

        Self::new(
            AssessmentService::new(dispatcher, sink),
            features,
            &config.server.service_name,
        )
    }
}

/// Build application router
///
/// The `/api/...` paths are kept as aliases for existing clients.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::serve_index))
        .route("/assessment", post(api::process_assessment))
        .route("/api/process-assessment", post(api::process_assessment))
        .route("/results", get(api::list_results))
        .route("/api/supabase/results", get(api::list_results))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
