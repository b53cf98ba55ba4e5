// ABOUTME: Remote text-generation layer with a transport seam for test injection
// ABOUTME: Defines the generate-content contract, generation settings, and retry policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

//! # Generation Transport
//!
//! This module defines the contract between the assistant and the remote
//! text-generation service. [`GenerateContent`] is the seam: the production
//! implementation is [`GeminiClient`], and tests inject fakes to simulate
//! network failures, rate limits, and canned replies without a server.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fitcoach_assistant::llm::{GenerateContent, GeneratePrompt};
//!
//! async fn example(transport: &dyn GenerateContent) {
//!     let prompt = GeneratePrompt::text("What's a good warm-up routine?");
//!     let reply = transport.generate(&prompt).await;
//! }
//! ```

mod gemini;
pub mod prompts;
mod retry;

pub use gemini::{GeminiClient, API_KEY_PREFIX};
pub use retry::RetryPolicy;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;
use crate::models::InlineImage;

/// Default sampling temperature for generation requests
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default cap on generated tokens
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

/// One outbound prompt, optionally carrying an inline image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratePrompt {
    /// Natural-language prompt text
    pub text: String,
    /// Optional base64-encoded image (injury-analysis variant)
    pub image: Option<InlineImage>,
}

impl GeneratePrompt {
    /// Create a text-only prompt
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    /// Attach an inline image to the prompt
    #[must_use]
    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// Fixed generation configuration sent with every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_output_tokens: u32,
    /// Nucleus sampling cutoff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Top-k sampling cutoff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            top_p: None,
            top_k: None,
        }
    }
}

/// Contract for sending one prompt and receiving one text reply
///
/// Implementations map every failure onto the crate's error taxonomy so the
/// assistant can convert them into user-visible messages uniformly.
#[async_trait]
pub trait GenerateContent: Send + Sync {
    /// Send the prompt and return the first candidate's text
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential`, `NetworkFailure`, `RateLimited`, or
    /// `MalformedResponse` per the taxonomy.
    async fn generate(&self, prompt: &GeneratePrompt) -> AppResult<String>;
}
