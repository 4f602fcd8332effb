//! Query generation through the Gemini `generateContent` endpoint.

use std::collections::HashSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use revmap_common::collaborators::QueryGenerator;
use revmap_common::error::CollaboratorError;

use crate::http;

const SERVICE: &str = "gemini";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent";
const TIMEOUT: Duration = Duration::from_secs(30);
const TEMPERATURE: f32 = 1.5;

pub struct GeminiClient {
    client: Client,
    api_key: String,
    url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: http::build_client(SERVICE, TIMEOUT, None)?,
            api_key: api_key.into(),
            url: BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl QueryGenerator for GeminiClient {
    async fn generate(&self, count: usize) -> Result<Vec<String>, CollaboratorError> {
        let body = GenerateRequest::new(count, &random_seed());
        tracing::debug!(count, "requesting sentences");

        let resp = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| http::transport(SERVICE, e))?;

        let parsed: GenerateResponse = http::read_json(SERVICE, resp).await?;
        Ok(parsed.sentences())
    }
}

fn random_seed() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    format!("{now}_{}", rand::random_range(1000..=9999))
}

fn prompt(count: usize, seed: &str) -> String {
    format!(
        "Generate at least {count} completely random, unique, unrelated sentences. \
         Each sentence must be in a different language if possible, and can be in any language in the world. \
         Each sentence must have more than one word. \
         Each sentence must be on a new line. \
         Do not repeat sentences or languages in any request. \
         No explanations, no numbering, no duplicates. \
         Use this random seed for extra randomness: {seed}"
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

impl GenerateRequest {
    fn new(count: usize, seed: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt(count, seed)),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: 100 + count * 20,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    /// One sentence per line of the first candidate's first part. Single-word
    /// lines and repeats are dropped.
    fn sentences(&self) -> Vec<String> {
        let text = self
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| p.text.as_deref())
            .unwrap_or_default();

        let mut seen = HashSet::new();
        text.lines()
            .map(str::trim)
            .filter(|line| line.split_whitespace().nth(1).is_some())
            .filter(|line| seen.insert(*line))
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(text: &str) -> GenerateResponse {
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        });
        http::decode(SERVICE, &body.to_string()).unwrap()
    }

    #[test]
    fn splits_lines_and_drops_single_words() {
        let parsed = response("  Der Hund schläft.  \nHello\n\nLe chat mange\n");
        assert_eq!(parsed.sentences(), vec!["Der Hund schläft.", "Le chat mange"]);
    }

    #[test]
    fn drops_repeated_lines() {
        let parsed = response("a quick fox\na quick fox\nanother line here");
        assert_eq!(parsed.sentences().len(), 2);
    }

    #[test]
    fn empty_candidates_yield_nothing() {
        let parsed: GenerateResponse = http::decode(SERVICE, r#"{"candidates": []}"#).unwrap();
        assert!(parsed.sentences().is_empty());

        let parsed: GenerateResponse = http::decode(SERVICE, "{}").unwrap();
        assert!(parsed.sentences().is_empty());
    }

    #[test]
    fn request_uses_api_field_names() {
        let body = serde_json::to_value(GenerateRequest::new(10, "seed")).unwrap();
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 300);
        assert_eq!(body["generationConfig"]["temperature"], 1.5);

        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Generate at least 10 "));
        assert!(text.ends_with("seed"));
    }

    #[tokio::test]
    async fn rate_limit_is_status_error() {
        let (base, server) = http::canned::serve_once(429, r#"{"error": {"code": 429}}"#).await;
        let client = GeminiClient::new("key").unwrap().with_base_url(base);

        let err = client.generate(3).await.unwrap_err();

        assert!(matches!(err, CollaboratorError::Status { service: "gemini", status: 429, .. }));
        assert!(server.await.unwrap().starts_with("POST /api?key=key"));
    }

    #[tokio::test]
    async fn success_returns_sentences() {
        let (base, _server) = http::canned::serve_once(
            200,
            r#"{"candidates": [{"content": {"parts": [{"text": "Der Hund schläft\nHello\nLe chat mange"}]}}]}"#,
        )
        .await;
        let client = GeminiClient::new("key").unwrap().with_base_url(base);

        let sentences = client.generate(3).await.unwrap();
        assert_eq!(sentences, vec!["Der Hund schläft", "Le chat mange"]);
    }
}
