//! API error responses.

use crate::assessment::ProcessError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors returned to HTTP callers as `{detail, kind}` JSON bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body missing, malformed or of the wrong shape.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Process(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Process(e) => e.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "detail": self.to_string(),
            "kind": self.kind(),
        }));

        (self.status(), body).into_response()
    }
}
