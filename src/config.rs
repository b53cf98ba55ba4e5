// ABOUTME: Environment-based configuration for the assistant core
// ABOUTME: Resolves the API credential, model, generation parameters, and storage directory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

//! # Configuration
//!
//! Environment-first configuration in the style of the rest of the
//! deployment: every knob has a `FITCOACH_*` variable and a sensible
//! default, and the API key is the single validated precondition before
//! any request is sent.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::llm::{
    GenerationSettings, API_KEY_PREFIX, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE,
};

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default model id
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Runtime configuration for the assistant
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Gemini API key
    pub api_key: String,
    /// Model id sent in the request path
    pub model: String,
    /// Optional base-URL override (test servers)
    pub base_url: Option<String>,
    /// Fixed generation parameters sent with every request
    pub generation: GenerationSettings,
    /// Request timeout applied by the HTTP client
    pub request_timeout: Duration,
    /// Directory holding the durable storage slots
    pub data_dir: PathBuf,
}

impl AssistantConfig {
    /// Load configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` when `GEMINI_API_KEY` is absent, empty,
    /// or does not carry the expected key prefix, and `ConfigError` when a
    /// numeric variable fails to parse.
    pub fn from_env() -> AppResult<Self> {
        let api_key = env::var(API_KEY_ENV).unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(AppError::missing_credential(format!(
                "{API_KEY_ENV} environment variable is not set"
            )));
        }
        if !api_key.starts_with(API_KEY_PREFIX) {
            return Err(AppError::missing_credential(format!(
                "{API_KEY_ENV} does not look like a real key (expected \"{API_KEY_PREFIX}\" prefix)"
            )));
        }

        let generation = GenerationSettings {
            temperature: parse_env("FITCOACH_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            max_output_tokens: parse_env("FITCOACH_MAX_OUTPUT_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS)?,
            top_p: parse_env_opt("FITCOACH_TOP_P")?,
            top_k: parse_env_opt("FITCOACH_TOP_K")?,
        };

        Ok(Self {
            api_key,
            model: env_var_or("FITCOACH_MODEL", DEFAULT_MODEL),
            base_url: env::var("FITCOACH_BASE_URL").ok(),
            generation,
            request_timeout: Duration::from_secs(parse_env(
                "FITCOACH_REQUEST_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            data_dir: resolve_data_dir(),
        })
    }
}

/// Default storage directory: `FITCOACH_DATA_DIR`, the platform data dir,
/// or the working directory as a last resort
fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("FITCOACH_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fitcoach")
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("{key} has an unparsable value: {raw}"))),
        Err(_) => Ok(default),
    }
}

fn parse_env_opt<T: std::str::FromStr>(key: &str) -> AppResult<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::config(format!("{key} has an unparsable value: {raw}"))),
        Err(_) => Ok(None),
    }
}
