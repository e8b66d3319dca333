//! Result persistence.
//!
//! Every assessment result goes to an append-only JSON-lines file first and
//! then, when configured, to a Supabase (PostgREST) table. The two writes are
//! independent and best-effort.

pub mod local;
pub mod remote;
pub mod sink;

pub use local::{LocalRecord, ResultsLog};
pub use remote::{score_summary, RemoteRecord, RemoteStore, ScoreSummary};
pub use sink::ResultSink;

use thiserror::Error;

/// Errors raised by either persistence target.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store not configured")]
    NotConfigured,

    #[error("results log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to record store at {0}")]
    Connect(String),

    #[error("record store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("record store error {status}: {body}")]
    Api { status: u16, body: String },
}
