//! Stored results listing

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::storage::StoreError;
use crate::AppState;

/// Response for GET /results.
///
/// Store problems are reported in the body, not through the status code.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResultsResponse {
    Success {
        status: &'static str,
        data: Vec<Value>,
        count: usize,
    },
    Error {
        error: String,
    },
}

impl ResultsResponse {
    fn success(data: Vec<Value>) -> Self {
        ResultsResponse::Success {
            status: "success",
            count: data.len(),
            data,
        }
    }

    fn error(e: StoreError) -> Self {
        ResultsResponse::Error {
            error: e.to_string(),
        }
    }
}

/// GET /results
pub async fn list_results(State(state): State<AppState>) -> Json<ResultsResponse> {
    let Some(store) = state.service.sink().remote() else {
        return Json(ResultsResponse::error(StoreError::NotConfigured));
    };

    match store.fetch_all().await {
        Ok(rows) => Json(ResultsResponse::success(rows)),
        Err(e) => {
            warn!("Failed to fetch stored results: {}", e);
            Json(ResultsResponse::error(e))
        }
    }
}
