//! Append-only JSON-lines results log.

use crate::models::AssessmentResult;
use crate::storage::StoreError;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One line of the results log.
#[derive(Debug, Serialize)]
pub struct LocalRecord<'a> {
    /// Submitting user (the profile name).
    pub id: &'a str,
    /// Unique per submission; `id` is not.
    pub submission_id: Uuid,
    pub answers: &'a [String],
    pub result: &'a AssessmentResult,
    /// Time the line was written, UTC, RFC 3339.
    pub timestamp: String,
}

/// Handle to the results log file.
///
/// The file is opened in append mode for every write, so restarts and
/// concurrent writers never truncate earlier lines.
#[derive(Debug, Clone)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `record` as a single UTF-8 JSON line.
    pub fn append(&self, record: &LocalRecord<'_>) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // One write call per line keeps lines from interleaving.
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
