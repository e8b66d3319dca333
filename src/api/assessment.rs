//! Assessment submission endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::warn;

use crate::api::error::ApiError;
use crate::models::{AssessmentRequest, AssessmentResult};
use crate::AppState;

/// POST /assessment
///
/// Runs one submission through the pipeline. Shape errors are rejected here,
/// before anything reaches the orchestrator.
///
/// Every body rejection is answered with 422 `validation_error`, including a
/// missing or non-JSON `Content-Type` (which would otherwise be a 415).
pub async fn process_assessment(
    State(state): State<AppState>,
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Result<Json<AssessmentResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected assessment request: {}", rejection.body_text());
        ApiError::Validation(rejection.body_text())
    })?;

    let result = state.service.process(request).await?;
    Ok(Json(result))
}
