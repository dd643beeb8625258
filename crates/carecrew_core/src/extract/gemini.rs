//! Gemini text-generation client.
//!
//! # Responsibility
//! - Send one `generateContent` request with a JSON response schema.
//! - Map transport and API failures onto `ExtractionError::Transport`.
//!
//! # Invariants
//! - The API key travels in a request header, never in the URL.
//! - No retry; one call per `generate`.

use super::ExtractionError;
use crate::config::GeminiConfig;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// One structured-output generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub response_schema: Value,
}

/// Boundary to the external text-generation service.
///
/// Returns `Ok(None)` when the service answered without any text.
pub trait TextGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, ExtractionError>;
}

impl<G: TextGenerator + ?Sized> TextGenerator for &G {
    fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, ExtractionError> {
        (**self).generate(request)
    }
}

impl<G: TextGenerator + ?Sized> TextGenerator for Box<G> {
    fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, ExtractionError> {
        (**self).generate(request)
    }
}

pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ExtractionError::Transport(err.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        )
    }

    fn headers(&self) -> Result<HeaderMap, ExtractionError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&self.config.api_key)
            .map_err(|_| ExtractionError::Transport("api key is not a valid header".to_string()))?;
        headers.insert(API_KEY_HEADER, key);
        Ok(headers)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl TextGenerator for GeminiClient {
    fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, ExtractionError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.response_schema,
            },
        };

        let response = self
            .client
            .post(self.build_url())
            .headers(self.headers()?)
            .json(&body)
            .send()
            .map_err(|err| ExtractionError::Transport(err.without_url().to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|err| ExtractionError::Transport(err.without_url().to_string()))?;
        if !status.is_success() {
            return Err(ExtractionError::Transport(format!("HTTP {status}: {text}")));
        }

        candidate_text(&text)
    }
}

/// Pulls the first candidate's text out of a `generateContent` body.
fn candidate_text(body: &str) -> Result<Option<String>, ExtractionError> {
    let parsed: GeminiResponse = serde_json::from_str(body).map_err(|err| {
        ExtractionError::Transport(format!("unreadable service envelope: {err}"))
    })?;

    if let Some(error) = parsed.error {
        return Err(ExtractionError::Transport(format!(
            "Gemini API error: {}",
            error.message
        )));
    }

    let text = parsed
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.is_empty());
    Ok(text)
}
