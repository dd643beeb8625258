//! Extraction of shifts and care tasks from free-text calendar events.
//!
//! # Responsibility
//! - Send one request per batch to the external text-generation service.
//! - Parse and validate the returned JSON into `ExtractionResult` records.
//!
//! # Invariants
//! - A batch is accepted whole or rejected whole.
//! - `Extractor::extract` never propagates failures; it logs and returns
//!   an empty list.
//! - No caching, retry or rate limiting.

pub mod gemini;
pub mod prompt;
pub mod result;

use crate::logging::sanitize_message;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const MAX_ERROR_LOG_CHARS: usize = 240;

pub use gemini::{GeminiClient, GenerationRequest, TextGenerator};
pub use result::{ExtractionResult, SuggestedTask, ValidationError};

#[derive(Debug)]
pub enum ExtractionError {
    /// Network failure, timeout, non-2xx status or service-reported error.
    Transport(String),
    /// The service answered without any text.
    EmptyResponse,
    /// Returned text is not a JSON array of extraction records.
    Parse(serde_json::Error),
    /// A record parsed but failed field validation.
    Invalid {
        index: usize,
        error: ValidationError,
    },
}

impl ExtractionError {
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_parse_failure(&self) -> bool {
        !self.is_transport_failure()
    }

    /// Stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "extract_transport_failed",
            Self::EmptyResponse => "extract_empty_response",
            Self::Parse(_) => "extract_parse_failed",
            Self::Invalid { .. } => "extract_invalid_record",
        }
    }
}

impl Display for ExtractionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "extraction request failed: {message}"),
            Self::EmptyResponse => write!(f, "extraction service returned no text"),
            Self::Parse(err) => write!(f, "extraction response is not valid JSON: {err}"),
            Self::Invalid { index, error } => {
                write!(f, "extraction record {index} rejected: {error}")
            }
        }
    }
}

impl Error for ExtractionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid { error, .. } => Some(error),
            Self::Transport(_) | Self::EmptyResponse => None,
        }
    }
}

/// Parses raw service text into validated extraction records.
pub fn parse_response(text: Option<&str>) -> Result<Vec<ExtractionResult>, ExtractionError> {
    let text = match text.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return Err(ExtractionError::EmptyResponse),
    };
    let results: Vec<ExtractionResult> =
        serde_json::from_str(text).map_err(ExtractionError::Parse)?;
    for (index, result) in results.iter().enumerate() {
        result
            .validate()
            .map_err(|error| ExtractionError::Invalid { index, error })?;
    }
    Ok(results)
}

/// Calendar-event extractor over a text-generation backend.
pub struct Extractor<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> Extractor<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Runs one extraction round-trip and reports failures as typed errors.
    pub fn try_extract<E: AsRef<str>>(
        &self,
        events: &[E],
    ) -> Result<Vec<ExtractionResult>, ExtractionError> {
        let started_at = Instant::now();
        info!(
            "event=extract module=extract status=start event_count={}",
            events.len()
        );

        let request = GenerationRequest {
            prompt: prompt::build_prompt(events),
            response_schema: prompt::response_schema(),
        };
        let outcome = self
            .generator
            .generate(&request)
            .and_then(|text| parse_response(text.as_deref()));

        match &outcome {
            Ok(results) => info!(
                "event=extract module=extract status=ok duration_ms={} results={}",
                started_at.elapsed().as_millis(),
                results.len()
            ),
            Err(err) => error!(
                "event=extract module=extract status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                sanitize_message(&err.to_string(), MAX_ERROR_LOG_CHARS)
            ),
        }
        outcome
    }

    /// Runs one extraction round-trip; any failure yields an empty list.
    pub fn extract<E: AsRef<str>>(&self, events: &[E]) -> Vec<ExtractionResult> {
        self.try_extract(events).unwrap_or_default()
    }
}
