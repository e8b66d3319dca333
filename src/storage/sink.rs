//! Dual-target result sink.

use crate::config::StorageConfig;
use crate::models::AssessmentResult;
use crate::storage::local::{LocalRecord, ResultsLog};
use crate::storage::remote::{score_summary, RemoteRecord, RemoteStore};
use crate::storage::StoreError;
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Writes each result to the local log and, if configured, the remote store.
///
/// `save` never fails: each target's error is logged and the other target is
/// still attempted. The local write always happens first.
#[derive(Debug, Clone)]
pub struct ResultSink {
    log: ResultsLog,
    remote: Option<RemoteStore>,
    origin: String,
}

impl ResultSink {
    pub fn new(log: ResultsLog, remote: Option<RemoteStore>, origin: impl Into<String>) -> Self {
        Self {
            log,
            remote,
            origin: origin.into(),
        }
    }

    /// Build from configuration. A store that cannot be set up is logged and
    /// left out; it never prevents start-up.
    pub fn from_config(config: &StorageConfig) -> Self {
        let remote = match RemoteStore::new(config) {
            Ok(store) => {
                info!("Supabase storage enabled (table {})", config.table);
                Some(store)
            }
            Err(StoreError::NotConfigured) => {
                info!("Supabase not configured - results go to the local log only");
                None
            }
            Err(e) => {
                error!("Supabase connection error: {}", e);
                None
            }
        };

        Self::new(ResultsLog::new(&config.results_log), remote, &config.origin)
    }

    /// The remote store, when one is configured.
    pub fn remote(&self) -> Option<&RemoteStore> {
        self.remote.as_ref()
    }

    /// Persist one result to every configured target.
    ///
    /// `submission_id` is the id the caller assigned to this submission; it is
    /// written to the local log line as-is.
    pub async fn save(
        &self,
        submission_id: Uuid,
        user_id: &str,
        answers: &[String],
        result: &AssessmentResult,
    ) {
        let local = LocalRecord {
            id: user_id,
            submission_id,
            answers,
            result,
            timestamp: Utc::now().to_rfc3339(),
        };
        match self.log.append(&local) {
            Ok(()) => info!("Result appended to {}", self.log.path().display()),
            Err(e) => error!("Failed to append result to local log: {}", e),
        }

        let Some(remote) = &self.remote else {
            return;
        };

        if let Err(e) = self.save_remote(remote, user_id, answers, result).await {
            warn!("Supabase save failed: {}", e);
            return;
        }
        info!("Supabase save complete");
    }

    async fn save_remote(
        &self,
        remote: &RemoteStore,
        user_id: &str,
        answers: &[String],
        result: &AssessmentResult,
    ) -> Result<(), StoreError> {
        let record = RemoteRecord {
            user_id: user_id.to_string(),
            score_summary: score_summary(answers),
            gpt_comment: serde_json::to_string(result)?,
            origin: self.origin.clone(),
        };
        remote.insert(&record).await
    }
}
