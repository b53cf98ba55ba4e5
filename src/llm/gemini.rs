// ABOUTME: Google Gemini generateContent client implementing the generation transport
// ABOUTME: Maps transport, status, and body failures onto the crate error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

//! # Gemini Client
//!
//! Implementation of [`GenerateContent`] against Google's Generative
//! Language API. One `generateContent` POST per call, no streaming; the
//! first candidate's first text part is the reply.
//!
//! ## Configuration
//!
//! The API key comes from [`crate::config::AssistantConfig`] (environment
//! variable `GEMINI_API_KEY`, Google AI Studio). Keys carry a fixed `AI`
//! prefix; anything else is treated as a missing credential before a
//! request is made.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{GenerateContent, GeneratePrompt, GenerationSettings};
use crate::errors::{AppError, AppResult};
use crate::models::InlineImage;

/// Base URL for the Generative Language API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model to use
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Fixed prefix carried by real API keys
pub const API_KEY_PREFIX: &str = "AI";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Gemini API request structure
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

/// Content structure for the Gemini API
#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

/// Part of content: text or inlined binary data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64 payload for multimodal parts
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

impl From<&InlineImage> for InlineData {
    fn from(image: &InlineImage) -> Self {
        Self {
            mime_type: image.mime_type.clone(),
            data: image.data.clone(),
        }
    }
}

/// Generation configuration in wire format
#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "topP", skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(rename = "topK", skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

impl From<&GenerationSettings> for GenerationConfig {
    fn from(settings: &GenerationSettings) -> Self {
        Self {
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
            top_p: settings.top_p,
            top_k: settings.top_k,
        }
    }
}

/// Safety threshold entry
#[derive(Debug, Clone, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

/// Categories blocked at medium-and-above probability on every request
const SAFETY_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

fn default_safety_settings() -> Vec<SafetySetting> {
    SAFETY_CATEGORIES
        .iter()
        .map(|category| SafetySetting {
            category,
            threshold: "BLOCK_MEDIUM_AND_ABOVE",
        })
        .collect()
}

/// Gemini API response structure
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

/// Response candidate
#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// API error body from Gemini
#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

/// Google Gemini `generateContent` client
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    settings: GenerationSettings,
    client: Client,
}

impl GeminiClient {
    /// Create a client with an API key and default model, settings, and timeout
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: API_BASE_URL.to_owned(),
            settings: GenerationSettings::default(),
            client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Set the model id
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL (test servers)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the generation settings
    #[must_use]
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        self
    }

    /// Whether a key looks like a real credential
    #[must_use]
    pub fn is_plausible_key(key: &str) -> bool {
        key.starts_with(API_KEY_PREFIX)
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn build_request(&self, prompt: &GeneratePrompt) -> GeminiRequest {
        let mut parts = vec![Part::Text {
            text: prompt.text.clone(),
        }];
        if let Some(image) = &prompt.image {
            parts.push(Part::InlineData {
                inline_data: image.into(),
            });
        }

        GeminiRequest {
            contents: vec![Content {
                role: Some("user".to_owned()),
                parts,
            }],
            generation_config: (&self.settings).into(),
            safety_settings: default_safety_settings(),
        }
    }

    /// Map a non-2xx status to the error taxonomy
    fn map_api_error(status: StatusCode, response_text: &str) -> AppError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.trim().to_owned(), |e| e.message);

        if status == StatusCode::TOO_MANY_REQUESTS {
            AppError::rate_limited(extract_quota_message(&message))
        } else {
            AppError::network(format!("service returned HTTP {status}: {message}"))
        }
    }

    /// Pull the first candidate's first text part out of a parsed response
    fn extract_text(response: GeminiResponse) -> AppResult<String> {
        if let Some(error) = response.error {
            return Err(AppError::malformed_response(format!(
                "service reported an error: {}",
                error.message
            )));
        }

        response
            .candidates
            .and_then(|mut c| (!c.is_empty()).then(|| c.remove(0)))
            .and_then(|c| c.content)
            .and_then(|content| {
                content.parts.into_iter().find_map(|part| match part {
                    Part::Text { text } => Some(text),
                    Part::InlineData { .. } => None,
                })
            })
            .ok_or_else(|| AppError::malformed_response("no text candidate in response"))
    }
}

/// Extract a user-friendly quota message from a 429 error body
///
/// Quota errors embed "Please retry in 6.406453963s."; surface the rounded
/// wait when present.
fn extract_quota_message(message: &str) -> String {
    if let Some(retry_pos) = message.find("Please retry in ") {
        let after_prefix = &message[retry_pos + 16..];
        if let Some(s_pos) = after_prefix.find('s') {
            if let Ok(seconds) = after_prefix[..s_pos].parse::<f64>() {
                let seconds_int = seconds.ceil() as u64;
                return format!("quota exceeded, retry in {seconds_int} seconds");
            }
        }
    }
    "quota exceeded, wait a moment and try again".to_owned()
}

#[async_trait]
impl GenerateContent for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, multimodal = prompt.image.is_some()))]
    async fn generate(&self, prompt: &GeneratePrompt) -> AppResult<String> {
        if !Self::is_plausible_key(&self.api_key) {
            return Err(AppError::missing_credential(format!(
                "API key is absent or does not start with \"{API_KEY_PREFIX}\""
            )));
        }

        let request = self.build_request(prompt);

        debug!("sending generateContent request");

        let response = self
            .client
            .post(self.build_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::network("request timed out").with_source(e)
                } else {
                    AppError::network("request could not complete").with_source(e)
                }
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AppError::network("failed to read response body").with_source(e))?;

        if !status.is_success() {
            error!(status = %status, "generation request rejected");
            return Err(Self::map_api_error(status, &response_text));
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!(error = %e, "unparsable generation response");
            AppError::malformed_response(format!("response body is not valid JSON: {e}"))
        })?;

        let text = Self::extract_text(parsed)?;
        debug!(chars = text.len(), "received generation response");
        Ok(text)
    }
}

impl Debug for GeminiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
