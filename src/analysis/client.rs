//! Chat-completions backend for free-text analysis.
//!
//! Sends the respondent's free-text answers to an OpenAI-compatible
//! `/chat/completions` endpoint in one call and parses the JSON object the
//! model returns into an [`AnalysisResult`].

use crate::config::AnalysisConfig;
use crate::models::{AnalysisResult, Profile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Failures talking to the analysis backend.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to analysis API at {0}")]
    Connect(String),

    #[error("failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("analysis API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("analysis API returned no choices")]
    EmptyResponse,

    #[error("failed to parse analysis: {0}")]
    Parse(String),
}

/// A remote capability able to analyze free-text responses.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Analyze `responses` in the context of `profile`.
    async fn analyze(
        &self,
        responses: &[String],
        profile: &Profile,
    ) -> Result<AnalysisResult, AnalysisError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// Chat-completions response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// OpenAI-compatible analysis backend.
pub struct ChatCompletionsBackend {
    config: AnalysisConfig,
    http_client: reqwest::Client,
}

impl ChatCompletionsBackend {
    /// Create a backend for the given settings.
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Send the prompt and return the raw message content.
    async fn send_prompt(&self, prompt: &str) -> Result<String, AnalysisError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(self.config.api_key.as_deref().unwrap_or_default())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    AnalysisError::Connect(self.config.base_url.clone())
                } else {
                    AnalysisError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api { status, body });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Parse(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(AnalysisError::EmptyResponse)
    }
}

#[async_trait]
impl AnalysisBackend for ChatCompletionsBackend {
    async fn analyze(
        &self,
        responses: &[String],
        profile: &Profile,
    ) -> Result<AnalysisResult, AnalysisError> {
        let prompt = build_prompt(responses, profile);
        debug!("Sending analysis prompt ({} chars)", prompt.len());

        let content = self.send_prompt(&prompt).await?;
        parse_analysis(&content)
    }

    fn describe(&self) -> String {
        format!("{} via {}", self.config.model, self.config.base_url)
    }
}

/// Build the user prompt for one submission.
pub fn build_prompt(responses: &[String], profile: &Profile) -> String {
    let mut prompt = String::new();
    prompt.push_str("Respondent profile:\n");
    prompt.push_str(&format!("- Name: {}\n", profile.name));
    prompt.push_str(&format!("- Age: {}\n", profile.age));
    prompt.push_str(&format!("- Department: {}\n\n", profile.department));

    prompt.push_str("Free-text responses:\n");
    if responses.is_empty() {
        prompt.push_str("(none given)\n");
    }
    for (i, response) in responses.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, response.trim()));
    }

    prompt.push_str("\nReturn the analysis as a single JSON object with exactly these keys:\n");
    prompt.push_str(r#"{"overview": "...", "characteristics": ["..."], "narrative": "...", "diagnostic_tags": ["..."], "alert_indicators": ["..."]}"#);
    prompt.push_str("\nUse an empty alert_indicators list unless a response warrants human follow-up.");
    prompt
}

/// Parse model output into an analysis, tolerating prose or code fences
/// around the JSON object.
pub fn parse_analysis(content: &str) -> Result<AnalysisResult, AnalysisError> {
    let start = content.find('{');
    let end = content.rfind('}');

    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => return Err(AnalysisError::Parse("no JSON object in response".to_string())),
    };

    serde_json::from_str(json).map_err(|e| AnalysisError::Parse(e.to_string()))
}

const SYSTEM_PROMPT: &str = r#"You are an occupational psychologist reviewing short free-text answers from an employee wellbeing questionnaire.
Summarize the respondent's state, list their main traits, and flag anything that needs human follow-up.
Be cautious: only list alert indicators for clear signs of distress, burnout or risk.
Only output valid JSON, no explanations or markdown."#;

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            name: "Aiko".to_string(),
            age: 29,
            department: "Engineering".to_string(),
        }
    }

    #[test]
    fn test_build_prompt_includes_profile_and_responses() {
        let responses = vec!["I feel fine".to_string(), "  stable  ".to_string()];
        let prompt = build_prompt(&responses, &profile());
        assert!(prompt.contains("Department: Engineering"));
        assert!(prompt.contains("1. I feel fine"));
        assert!(prompt.contains("2. stable\n"));
        assert!(prompt.contains("alert_indicators"));
    }

    #[test]
    fn test_build_prompt_without_responses() {
        let prompt = build_prompt(&[], &profile());
        assert!(prompt.contains("(none given)"));
    }

    #[test]
    fn test_parse_analysis_with_code_fence() {
        let content = "Here you go:\n```json\n{\"overview\":\"Tired\",\"characteristics\":[\"diligent\"],\"narrative\":\"n\",\"diagnostic_tags\":[\"fatigue\"],\"alert_indicators\":[\"overwork\"]}\n```";
        let analysis = parse_analysis(content).unwrap();
        assert_eq!(analysis.overview, "Tired");
        assert_eq!(analysis.primary_alert(), Some("overwork"));
    }

    #[test]
    fn test_parse_analysis_missing_field() {
        let content = r#"{"overview":"o","characteristics":[],"narrative":"n","diagnostic_tags":[]}"#;
        assert!(matches!(
            parse_analysis(content),
            Err(AnalysisError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_analysis_not_json() {
        assert!(parse_analysis("I cannot help with that.").is_err());
        assert!(parse_analysis("} backwards {").is_err());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = AnalysisConfig {
            base_url: "http://localhost:1234/v1/".to_string(),
            ..AnalysisConfig::default()
        };
        let backend = ChatCompletionsBackend::new(config).unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:1234/v1/chat/completions");
    }
}
