//! Supabase / PostgREST record store client.

use crate::config::StorageConfig;
use crate::storage::StoreError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Per-question scores keyed `q1`..`q10`.
pub type ScoreSummary = IndexMap<String, i64>;

/// Only the first this-many answers are scored.
const SCORED_ANSWERS: usize = 10;

/// Row inserted into the results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub user_id: String,
    pub score_summary: ScoreSummary,
    /// The full assessment result, serialized as a JSON string.
    pub gpt_comment: String,
    pub origin: String,
}

/// Build the score summary from the first ten answers.
///
/// Answers that are not plain non-negative integers are skipped rather than
/// zero-filled; keys are 1-indexed by position. Full-width digits, as typed
/// through a Japanese IME, count as digits.
pub fn score_summary(answers: &[String]) -> ScoreSummary {
    answers
        .iter()
        .take(SCORED_ANSWERS)
        .enumerate()
        .filter_map(|(i, answer)| {
            let digits = ascii_digits(answer)?;
            let score = digits.parse::<i64>().ok()?;
            Some((format!("q{}", i + 1), score))
        })
        .collect()
}

/// `answer` with full-width digits folded to ASCII, or `None` if it is empty
/// or holds anything other than decimal digits.
fn ascii_digits(answer: &str) -> Option<String> {
    if answer.is_empty() {
        return None;
    }
    answer
        .chars()
        .map(|c| match c {
            '0'..='9' => Some(c),
            '\u{FF10}'..='\u{FF19}' => char::from_u32(u32::from(c) - 0xFF10 + u32::from('0')),
            _ => None,
        })
        .collect()
}

/// Client for one PostgREST table.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    base_url: String,
    api_key: String,
    table: String,
    timeout_seconds: u64,
    http_client: reqwest::Client,
}

impl RemoteStore {
    /// Build a client, or [`StoreError::NotConfigured`] when URL or key is missing.
    pub fn new(config: &StorageConfig) -> Result<Self, StoreError> {
        if !config.is_enabled() {
            return Err(StoreError::NotConfigured);
        }
        let (Some(url), Some(key)) = (&config.supabase_url, &config.supabase_key) else {
            return Err(StoreError::NotConfigured);
        };

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            api_key: key.clone(),
            table: config.table.clone(),
            timeout_seconds: config.timeout_seconds,
            http_client,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn map_send_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.timeout_seconds)
        } else if e.is_connect() {
            StoreError::Connect(self.base_url.clone())
        } else {
            StoreError::Request(e)
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Api { status, body })
    }

    /// Insert one record.
    pub async fn insert(&self, record: &RemoteRecord) -> Result<(), StoreError> {
        debug!("Inserting record for {} into {}", record.user_id, self.table);

        let response = self
            .http_client
            .post(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// Fetch every row of the table.
    pub async fn fetch_all(&self) -> Result<Vec<Value>, StoreError> {
        let response = self
            .http_client
            .get(self.table_url())
            .query(&[("select", "*")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let rows: Vec<Value> = Self::check_status(response).await?.json().await?;
        Ok(rows)
    }
}
