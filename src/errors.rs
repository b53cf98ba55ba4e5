// ABOUTME: Unified error handling for the assistant core with a typed failure taxonomy
// ABOUTME: Defines error codes, the AppError type, and retryability classification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

//! # Unified Error Handling System
//!
//! This module provides the centralized error handling system for the
//! assistant core. Every failure that can reach a caller is expressed as an
//! [`AppError`] carrying an [`ErrorCode`], so the assistant layer can decide
//! uniformly which failures become user-visible error messages and which
//! failures are retryable.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Remote generation service (1000-1999)
    /// The API key is absent, a placeholder, or malformed
    #[serde(rename = "MISSING_CREDENTIAL")]
    MissingCredential = 1000,
    /// The request could not complete, or the service returned a non-2xx status
    #[serde(rename = "NETWORK_FAILURE")]
    NetworkFailure = 1001,
    /// The service answered 200 but the expected content was missing or unparsable
    #[serde(rename = "MALFORMED_RESPONSE")]
    MalformedResponse = 1002,
    /// The service rejected the request with HTTP 429
    #[serde(rename = "RATE_LIMITED")]
    RateLimited = 1003,

    // Validation (3000-3999)
    /// The provided input is invalid
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,

    // Configuration (6000-6999)
    /// Configuration is missing or invalid
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,

    // Internal (9000-9999)
    /// An internal error occurred
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// A durable-storage operation failed
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9001,
    /// Data serialization or deserialization failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9002,
}

impl ErrorCode {
    /// Whether a failure with this code is worth retrying
    ///
    /// Only transient remote failures qualify. Everything else (bad input,
    /// bad configuration, malformed responses) would fail identically on a
    /// second attempt.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::NetworkFailure | Self::RateLimited)
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::MissingCredential => "No valid API key is configured for the AI service",
            Self::NetworkFailure => "The AI service could not be reached",
            Self::MalformedResponse => "The AI service returned an unexpected response",
            Self::RateLimited => "The AI service rate limit was exceeded",
            Self::InvalidInput => "The provided input is invalid",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal error occurred",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Unified error type for the assistant core
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Whether this failure is worth retrying
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Render the diagnostic shown to the user inside a synthesized
    /// assistant error message
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.code.description(), self.message)
    }

    /// Missing or malformed API credential
    #[must_use]
    pub fn missing_credential(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingCredential, message)
    }

    /// Network-level failure or non-2xx response
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkFailure, message)
    }

    /// Successful status but unusable response body
    #[must_use]
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedResponse, message)
    }

    /// HTTP 429 from the remote service
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, message)
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Durable-storage failure
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Serialization failure
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Conversion from `anyhow::Error` at the application boundary
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(ErrorCode::InternalError, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ErrorCode::NetworkFailure.is_retryable());
        assert!(ErrorCode::RateLimited.is_retryable());
        assert!(!ErrorCode::MissingCredential.is_retryable());
        assert!(!ErrorCode::MalformedResponse.is_retryable());
        assert!(!ErrorCode::StorageError.is_retryable());
    }

    #[test]
    fn test_app_error_display() {
        let error = AppError::rate_limited("retry in 6 seconds");
        assert!(error.to_string().contains("rate limit"));
        assert!(error.user_message().contains("retry in 6 seconds"));
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::MalformedResponse).unwrap();
        assert_eq!(json, "\"MALFORMED_RESPONSE\"");
    }

    #[test]
    fn test_source_chaining() {
        let io = std::io::Error::other("disk full");
        let error = AppError::storage("failed to persist history").with_source(io);
        assert!(std::error::Error::source(&error).is_some());
    }
}
