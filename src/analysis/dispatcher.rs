//! Analysis dispatch with fallback.

use crate::analysis::client::{AnalysisBackend, ChatCompletionsBackend};
use crate::config::AnalysisConfig;
use crate::models::{AnalysisResult, Profile};
use std::sync::Arc;
use tracing::{info, warn};

/// Routes free-text responses to the remote backend when one is configured
/// and degrades to [`fallback_analysis`] on any failure.
#[derive(Clone, Default)]
pub struct AnalysisDispatcher {
    backend: Option<Arc<dyn AnalysisBackend>>,
}

impl AnalysisDispatcher {
    /// Dispatcher that always returns the fallback result.
    pub fn fallback_only() -> Self {
        Self { backend: None }
    }

    /// Dispatcher delegating to `backend`.
    pub fn with_backend(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Build from configuration; an unusable key or client means fallback only.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        if !config.is_enabled() {
            info!("Analysis API key not set - using fallback analysis");
            return Self::fallback_only();
        }

        match ChatCompletionsBackend::new(config.clone()) {
            Ok(backend) => {
                info!(
                    "Analysis API configured: {} (key {})",
                    backend.describe(),
                    config.masked_key().unwrap_or_default()
                );
                Self::with_backend(Arc::new(backend))
            }
            Err(e) => {
                warn!("Failed to build analysis client, using fallback: {}", e);
                Self::fallback_only()
            }
        }
    }

    /// Whether a remote backend is wired in.
    pub fn is_remote(&self) -> bool {
        self.backend.is_some()
    }

    /// Analyze the responses. Never fails.
    pub async fn analyze(&self, responses: &[String], profile: &Profile) -> AnalysisResult {
        info!(
            department = %profile.department,
            responses = responses.len(),
            "Analysis started"
        );

        let Some(backend) = &self.backend else {
            return fallback_analysis(profile);
        };

        match backend.analyze(responses, profile).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Remote analysis failed, using fallback: {}", e);
                fallback_analysis(profile)
            }
        }
    }
}

/// Fixed, non-personalized analysis seeded with the profile's department.
pub fn fallback_analysis(profile: &Profile) -> AnalysisResult {
    AnalysisResult {
        overview: format!("Stable state within the {} department", profile.department),
        characteristics: ["sense of responsibility", "cooperativeness", "drive to improve"]
            .into_iter()
            .map(String::from)
            .collect(),
        narrative: "Evaluation produced by fallback analysis".to_string(),
        diagnostic_tags: std::iter::once("stable_state".to_string()).collect(),
        alert_indicators: Vec::new(),
    }
}
