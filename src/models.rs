//! Data models for the assessment service.
//!
//! This module contains the request and result structures exchanged over
//! HTTP and handed between the dispatcher, orchestrator and sink.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Who submitted the assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name of the respondent.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Department the respondent belongs to.
    pub department: String,
}

/// A complete assessment submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRequest {
    /// Respondent profile.
    pub profile: Profile,
    /// Answers to the scored questionnaire, in question order.
    pub answers: Vec<String>,
    /// Client-side submission time, as sent by the client.
    pub timestamp: String,
    /// Department-specific questions shown to the respondent.
    pub department_questions: Vec<String>,
    /// Free-text answers forwarded to the analysis backend.
    pub quiet_responses: Vec<String>,
    /// Free-text description of the respondent's "heart landscape".
    pub heart_landscape: String,
}

/// Structured analysis of the free-text responses.
///
/// `characteristics` and `diagnostic_tags` are ordered sets: duplicates are
/// dropped on construction and deserialization, first occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// One-line summary of the respondent's state.
    pub overview: String,
    /// Trait labels.
    pub characteristics: IndexSet<String>,
    /// Longer prose analysis.
    pub narrative: String,
    /// Machine-readable tags such as `stable_state`.
    pub diagnostic_tags: IndexSet<String>,
    /// Conditions that warrant human follow-up, most important first.
    pub alert_indicators: Vec<String>,
}

impl AnalysisResult {
    /// Whether any alert indicator was raised.
    pub fn has_alert(&self) -> bool {
        !self.alert_indicators.is_empty()
    }

    /// The indicator reported as the alert reason, if any.
    pub fn primary_alert(&self) -> Option<&str> {
        self.alert_indicators.first().map(String::as_str)
    }
}

/// The result returned to the caller and persisted by the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub profile: Profile,
    pub analysis: AnalysisResult,
    pub final_diagnosis: String,
    /// `true` iff `analysis.alert_indicators` is non-empty.
    pub alert: bool,
    /// First alert indicator when `alert` is set.
    pub alert_reason: Option<String>,
    pub image_prompt: String,
    /// Always `None`; image generation is not wired up.
    pub image_url: Option<String>,
    /// Server-side completion time, UTC, RFC 3339.
    pub timestamp: String,
}
