// ABOUTME: Core data structures for assistant conversations and biometric input
// ABOUTME: Defines persisted messages, message kinds, and the diet-plan request payload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

//! # Data Models
//!
//! Common data structures shared across the assistant core: the persisted
//! conversation [`Message`], the [`BiometricInput`] consumed by the diet-plan
//! request builder, and the [`InlineImage`] payload for injury analysis.
//!
//! Messages are the only persisted shape; biometric input is transient and
//! only its rendering into a prompt (and the resulting messages) survives.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// String representation used in API payloads
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// What a message represents within a feature flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Free-text chat turn
    Chat,
    /// User request for a diet plan (rendered biometrics)
    DietRequest,
    /// Assistant-generated diet plan
    DietPlan,
    /// User request for an injury analysis
    InjuryRequest,
    /// Assistant-generated injury analysis
    InjuryAnalysis,
    /// Synthesized assistant message describing a failed call
    Error,
}

/// A single persisted conversation message
///
/// Timestamps serialize as RFC 3339 so histories written by one process
/// revision stay readable by the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier
    pub id: Uuid,
    /// Role of the message sender
    pub role: MessageRole,
    /// What this message represents
    pub kind: MessageKind,
    /// Message text; never empty for persisted messages
    pub content: String,
    /// Creation timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message with a fresh id and the current timestamp
    #[must_use]
    pub fn new(role: MessageRole, kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            kind,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user chat message
    #[must_use]
    pub fn user_chat(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, MessageKind::Chat, content)
    }

    /// Create an assistant chat message
    #[must_use]
    pub fn assistant_chat(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, MessageKind::Chat, content)
    }

    /// Create a synthesized assistant error message from a failed call
    #[must_use]
    pub fn from_failure(error: &AppError) -> Self {
        Self::new(MessageRole::Assistant, MessageKind::Error, error.user_message())
    }

    /// Whether this message satisfies the persistence invariant
    #[must_use]
    pub fn is_persistable(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Gender options recognized by the metabolic formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male constants in the Mifflin-St Jeor equation
    Male,
    /// Non-male constants in the Mifflin-St Jeor equation
    Other,
}

/// Dietary goal driving the calorie adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    /// Caloric deficit (-15% of TDEE)
    WeightLoss,
    /// Caloric surplus (+15% of TDEE)
    WeightGain,
}

/// Biometric parameters for a diet-plan request
///
/// Transient: constructed by the caller, consumed once by the request
/// builder, never persisted itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiometricInput {
    /// Age in whole years, must be positive
    pub age: u32,
    /// Gender for the metabolic formula
    pub gender: Gender,
    /// Body weight in kilograms, must be positive
    pub weight_kg: f64,
    /// Height in centimeters, must be positive
    pub height_cm: f64,
    /// Dietary goal
    pub goal: Goal,
    /// Free-text medical conditions to surface to the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
}

impl BiometricInput {
    /// Validate field ranges before any derived value is computed
    ///
    /// Height in particular must be positive: the BMI division is undefined
    /// at zero.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first offending field.
    pub fn validate(&self) -> AppResult<()> {
        if self.age == 0 {
            return Err(AppError::invalid_input("age must be greater than zero"));
        }
        if self.weight_kg <= 0.0 || !self.weight_kg.is_finite() {
            return Err(AppError::invalid_input(
                "weight_kg must be a positive number",
            ));
        }
        if self.height_cm <= 0.0 || !self.height_cm.is_finite() {
            return Err(AppError::invalid_input(
                "height_cm must be a positive number",
            ));
        }
        Ok(())
    }
}

/// Inline image payload for the injury-analysis variant
///
/// Carried base64-encoded, matching the generation API's `inlineData` part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    /// MIME type of the encoded image (e.g. `image/jpeg`)
    pub mime_type: String,
    /// Base64-encoded image bytes
    pub data: String,
}

impl InlineImage {
    /// Encode raw image bytes for transport
    #[must_use]
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }
}
