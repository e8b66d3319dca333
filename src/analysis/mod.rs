//! Free-text analysis.
//!
//! The dispatcher delegates to a chat-completions backend when one is
//! configured and otherwise returns a fixed fallback analysis.

pub mod client;
pub mod dispatcher;

pub use client::{AnalysisBackend, AnalysisError, ChatCompletionsBackend};
pub use dispatcher::{fallback_analysis, AnalysisDispatcher};
