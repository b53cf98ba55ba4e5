// ABOUTME: Library entry point for the FitCoach assistant core
// ABOUTME: Exposes the session store, prompt builder, generation client, and plan parser
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

#![deny(unsafe_code)]

//! # FitCoach Assistant
//!
//! The chat and diet-plan assistant core of a fitness tracking
//! application: conversation state that survives restarts, deterministic
//! biometric math feeding a fixed prompt template, a Gemini
//! `generateContent` client with a typed failure taxonomy and bounded
//! retry, and a strict parser for the model's free-text plans.
//!
//! ## Features
//!
//! - **Session store**: ordered message histories persisted as JSON under
//!   fixed slots, failing open on corrupt payloads
//! - **Request builder**: pure prompt construction with BMI/BMR/TDEE and
//!   calorie targets derived per request
//! - **Assistant client**: optimistic user-message persistence, one
//!   assistant message per call, taxonomy failures surfaced as persisted
//!   error messages
//! - **Plan parser**: section-outline parsing that fails loudly when the
//!   model drops an expected heading
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fitcoach_assistant::assistant::Assistant;
//! use fitcoach_assistant::config::AssistantConfig;
//! use fitcoach_assistant::errors::AppResult;
//! use fitcoach_assistant::store::FileBackend;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = AssistantConfig::from_env()?;
//!     let backend = Arc::new(FileBackend::new(&config.data_dir)?);
//!     let assistant = Assistant::new(&config, backend);
//!
//!     if let Some(reply) = assistant.send_chat("How do I warm up for squats?").await? {
//!         println!("{}", reply.content);
//!     }
//!     Ok(())
//! }
//! ```

/// Assistant client orchestrating storage, prompts, transport, and retry
pub mod assistant;

/// Environment-based configuration
pub mod config;

/// Unified error handling
pub mod errors;

/// Remote text-generation layer (client, transport seam, retry, prompts)
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Derived biometric metrics
pub mod metrics;

/// Core data structures
pub mod models;

/// Strict parsers for model-generated plans
pub mod plans;

/// Durable session store
pub mod store;
