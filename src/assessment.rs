//! Assessment processing pipeline.
//!
//! Runs one submission through analysis, derives the alert flag, assembles
//! the [`AssessmentResult`] and hands it to the result sink.

use crate::analysis::AnalysisDispatcher;
use crate::models::{AnalysisResult, AssessmentRequest, AssessmentResult, Profile};
use crate::storage::ResultSink;
use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Placeholder diagnosis until a final-diagnosis stage exists.
pub const FINAL_DIAGNOSIS: &str = "Assessment complete";

/// Placeholder prompt for the (disabled) image generator.
pub const IMAGE_PROMPT: &str = "Beautiful landscape";

/// Failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The dispatcher broke its no-failure contract.
    #[error("assessment processing failed: {0}")]
    AnalysisFailed(String),
}

impl ProcessError {
    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::AnalysisFailed(_) => "analysis_failed",
        }
    }
}

/// The submission pipeline: dispatcher in, sink out.
#[derive(Clone)]
pub struct AssessmentService {
    dispatcher: AnalysisDispatcher,
    sink: ResultSink,
}

impl AssessmentService {
    pub fn new(dispatcher: AnalysisDispatcher, sink: ResultSink) -> Self {
        Self { dispatcher, sink }
    }

    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    /// Process one validated submission under a fresh submission id.
    pub async fn process(
        &self,
        request: AssessmentRequest,
    ) -> Result<AssessmentResult, ProcessError> {
        self.process_submission(Uuid::new_v4(), request).await
    }

    /// Process one submission under `submission_id`.
    ///
    /// Every event emitted while the submission is handled, including the
    /// dispatcher's and the sink's, runs inside an `assessment` span carrying
    /// the id. The same id is written to the local log line.
    pub async fn process_submission(
        &self,
        submission_id: Uuid,
        request: AssessmentRequest,
    ) -> Result<AssessmentResult, ProcessError> {
        async move {
            info!(department = %request.profile.department, "Assessment processing started");

            // A panicking backend is the only way the dispatcher can fail.
            let analysis = AssertUnwindSafe(
                self.dispatcher
                    .analyze(&request.quiet_responses, &request.profile),
            )
            .catch_unwind()
            .await
            .map_err(|payload| {
                let message = panic_message(&*payload);
                error!("Analysis aborted: {}", message);
                ProcessError::AnalysisFailed(message)
            })?;

            let AssessmentRequest {
                profile, answers, ..
            } = request;

            let result = assemble_result(profile, analysis);

            self.sink
                .save(submission_id, &result.profile.name, &answers, &result)
                .await;

            info!(alert = result.alert, "Assessment complete");
            Ok::<_, ProcessError>(result)
        }
        .instrument(info_span!("assessment", %submission_id))
        .await
    }
}

/// Assemble the caller-facing result from an analysis.
pub fn assemble_result(profile: Profile, analysis: AnalysisResult) -> AssessmentResult {
    let alert = analysis.has_alert();
    let alert_reason = analysis.primary_alert().map(String::from);

    AssessmentResult {
        profile,
        analysis,
        final_diagnosis: FINAL_DIAGNOSIS.to_string(),
        alert,
        alert_reason,
        image_prompt: IMAGE_PROMPT.to_string(),
        image_url: None,
        timestamp: Utc::now().to_rfc3339(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "analysis panicked".to_string()
    }
}
