//! Remote text-generation client — the fallback collaborator for turns
//! no local heuristic can answer.
//!
//! The wire format is the `generateContent` shape: a POST with
//! `{"contents":[{"parts":[{"text": prompt}]}]}` answered by
//! `candidates[0].content.parts[0].text`. Every failure is a typed
//! `GenerationError`; the triage engine recovers all of them locally and
//! never surfaces one to the patient.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config;

/// Errors from the generation backend.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("cannot reach generation backend at {0}")]
    Connect(String),
    #[error("generation request timed out after {0}s")]
    Timeout(u64),
    #[error("generation backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
    #[error("http client error: {0}")]
    HttpClient(String),
}

/// Seam for the remote text-generation collaborator.
///
/// The engine depends on this trait, not on the HTTP client, so tests
/// can drive every fallback path without a network.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// HTTP client for the remote generation backend.
pub struct GenerationClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GenerationClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Build a client from `TRIAGECARE_GENERATION_*` environment
    /// variables, falling back to the bundled defaults.
    pub fn from_env() -> Self {
        let base_url = std::env::var(config::ENV_GENERATION_URL)
            .unwrap_or_else(|_| config::DEFAULT_GENERATION_URL.to_string());
        let api_key = std::env::var(config::ENV_GENERATION_API_KEY).unwrap_or_default();
        let model = std::env::var(config::ENV_GENERATION_MODEL)
            .unwrap_or_else(|_| config::DEFAULT_GENERATION_MODEL.to_string());
        Self::new(&base_url, &api_key, &model, config::GENERATION_TIMEOUT_SECS)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

#[async_trait]
impl TextGenerator for GenerationClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let mut request = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            request = request.query(&[("key", self.api_key.as_str())]);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                GenerationError::Connect(self.base_url.clone())
            } else if e.is_timeout() {
                GenerationError::Timeout(self.timeout_secs)
            } else {
                GenerationError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| GenerationError::MalformedResponse("no candidates in response".into()))
    }
}

/// Build the intake prompt for the generation backend.
///
/// The free-text portion is capped at `MAX_MESSAGE_CHARS` characters;
/// the symptom list is bounded by the fixed vocabulary, so the overall
/// prompt size is bounded too.
pub fn build_prompt(recognized: &BTreeSet<String>, utterance: &str) -> String {
    let mut prompt = String::from(
        "You are TriageCare AI, a medical intake assistant. Respond to the patient \
         message below professionally and helpfully.\n\
         Guidelines:\n\
         - Provide empathetic, professional responses\n\
         - Ask relevant follow-up questions about symptoms\n\
         - Suggest appropriate care levels (urgent care, general physician, emergency room)\n\
         - Never provide specific medical diagnoses\n\
         - Keep responses concise (2-3 sentences)\n\
         - Always recommend consulting healthcare professionals\n",
    );

    if !recognized.is_empty() {
        let listed = recognized.iter().cloned().collect::<Vec<_>>().join(", ");
        prompt.push_str(&format!("Symptoms mentioned so far: {listed}.\n"));
    }

    prompt.push_str(&format!(
        "Patient message: \"{}\"",
        truncate_chars(utterance, config::MAX_MESSAGE_CHARS)
    ));
    prompt
}

/// Truncate to at most `max_chars` characters on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = GenerationClient::new("http://localhost:9999/", "", "test-model", 10);
        assert_eq!(client.base_url(), "http://localhost:9999");
    }

    #[test]
    fn from_env_produces_usable_client() {
        let client = GenerationClient::from_env();
        assert!(!client.base_url().is_empty());
        assert!(!client.model().is_empty());
    }

    #[test]
    fn prompt_includes_guidelines_and_message() {
        let prompt = build_prompt(&BTreeSet::new(), "my ears are ringing");
        assert!(prompt.contains("medical intake assistant"));
        assert!(prompt.contains("Never provide specific medical diagnoses"));
        assert!(prompt.contains("Patient message: \"my ears are ringing\""));
        assert!(!prompt.contains("Symptoms mentioned so far"));
    }

    #[test]
    fn prompt_lists_recognized_symptoms() {
        let recognized: BTreeSet<String> =
            ["cough", "fever"].iter().map(|s| s.to_string()).collect();
        let prompt = build_prompt(&recognized, "it is getting worse");
        assert!(prompt.contains("Symptoms mentioned so far: cough, fever."));
    }

    #[test]
    fn prompt_caps_free_text() {
        let long = "x".repeat(10_000);
        let prompt = build_prompt(&BTreeSet::new(), &long);
        assert!(prompt.len() < 10_000);
        assert!(prompt.contains(&"x".repeat(crate::config::MAX_MESSAGE_CHARS)));
    }

    #[test]
    fn truncate_is_char_boundary_safe() {
        let text = "émincé de symptômes";
        let cut = truncate_chars(text, 6);
        assert_eq!(cut, "émincé");
        assert_eq!(truncate_chars("short", 100), "short");
    }

    /// Compile-time check that the client satisfies the trait object
    /// the engine stores.
    #[test]
    fn client_satisfies_text_generator_trait() {
        fn _accepts(_g: std::sync::Arc<dyn TextGenerator>) {}
        let client = GenerationClient::new("http://localhost:9999", "", "m", 1);
        _accepts(std::sync::Arc::new(client));
    }

    #[tokio::test]
    async fn unreachable_backend_yields_typed_error() {
        // Nothing listens on this port; the send must fail, not panic.
        let client = GenerationClient::new("http://127.0.0.1:9", "", "test-model", 1);
        let result = client.generate("hello").await;
        assert!(result.is_err());
    }
}
