// ABOUTME: Assistant client orchestrating store, prompt builder, transport, and retry
// ABOUTME: Converts taxonomy failures into persisted error messages instead of raising
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

//! # Assistant Client
//!
//! The [`Assistant`] ties the pieces together: it persists the user's
//! message before the network call, sends the built prompt through the
//! retry policy, and always appends exactly one assistant message per call.
//! When the remote call fails with a taxonomy error (missing credential,
//! network failure, malformed response, rate limit) the failure becomes a
//! persisted `kind=error` message carrying a human-readable diagnostic;
//! only storage and input-validation failures propagate to the caller.
//!
//! Each call runs the `Idle -> Sending -> {Succeeded, Failed} -> Idle`
//! lifecycle independently; concurrent calls are not coordinated, and
//! interleaved store writes resolve last-write-wins at the slot level.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use crate::config::AssistantConfig;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::prompts::{build_chat_prompt, build_diet_prompt, build_injury_prompt};
use crate::llm::{GeminiClient, GenerateContent, GeneratePrompt, RetryPolicy};
use crate::models::{BiometricInput, Goal, InlineImage, Message, MessageKind, MessageRole};
use crate::plans::{DietPlan, InjuryReport};
use crate::store::{
    CredentialStatus, CredentialStatusStore, DailyMessageLog, MessageStore, StorageBackend,
    CHAT_HISTORY_SLOT, CREDENTIAL_STATUS_SLOT, DAILY_DIET_LOG_SLOT, DIET_MESSAGES_SLOT,
};

/// Result of a diet-plan request
#[derive(Debug, Clone)]
pub struct DietPlanOutcome {
    /// The assistant message appended to the diet history
    pub message: Message,
    /// The parsed plan when the call and parse succeeded
    pub plan: Option<DietPlan>,
}

/// Result of an injury-analysis request
#[derive(Debug, Clone)]
pub struct InjuryOutcome {
    /// The assistant message appended to the chat history
    pub message: Message,
    /// The parsed report when the call and parse succeeded
    pub report: Option<InjuryReport>,
}

/// Chat and diet-plan assistant over injectable storage and transport
pub struct Assistant {
    transport: Arc<dyn GenerateContent>,
    retry: RetryPolicy,
    chat: MessageStore,
    diet: MessageStore,
    daily: DailyMessageLog,
    credential: CredentialStatusStore,
    busy: AtomicBool,
}

impl Assistant {
    /// Create an assistant backed by the real Gemini client
    #[must_use]
    pub fn new(config: &AssistantConfig, backend: Arc<dyn StorageBackend>) -> Self {
        let mut client = GeminiClient::new(&config.api_key)
            .with_model(&config.model)
            .with_settings(config.generation.clone())
            .with_timeout(config.request_timeout);
        if let Some(base_url) = &config.base_url {
            client = client.with_base_url(base_url);
        }
        Self::with_transport(Arc::new(client), backend)
    }

    /// Create an assistant over an arbitrary transport (tests, fakes)
    #[must_use]
    pub fn with_transport(
        transport: Arc<dyn GenerateContent>,
        backend: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
            chat: MessageStore::new(Arc::clone(&backend), CHAT_HISTORY_SLOT),
            diet: MessageStore::new(Arc::clone(&backend), DIET_MESSAGES_SLOT),
            daily: DailyMessageLog::new(Arc::clone(&backend), DAILY_DIET_LOG_SLOT),
            credential: CredentialStatusStore::new(backend, CREDENTIAL_STATUS_SLOT),
            busy: AtomicBool::new(false),
        }
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether a generation call is currently in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Chat
    // ========================================================================

    /// Send one free-text chat turn
    ///
    /// Empty or whitespace-only input is a no-op: nothing is appended and
    /// no network call is made. Otherwise the user message is persisted
    /// before the network call, and exactly one assistant message (reply
    /// or synthesized error) is appended and returned.
    ///
    /// # Errors
    ///
    /// Returns storage failures only; remote failures become the returned
    /// error message.
    #[instrument(skip(self, text))]
    pub async fn send_chat(&self, text: &str) -> AppResult<Option<Message>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("ignoring empty chat input");
            return Ok(None);
        }

        self.chat.append(Message::user_chat(trimmed))?;

        let prompt = GeneratePrompt::text(build_chat_prompt(trimmed));
        let message = match self.dispatch(&prompt).await {
            Ok(reply) => Message::assistant_chat(reply),
            Err(e) => self.failure_message(&e),
        };
        self.chat.append(message.clone())?;
        Ok(Some(message))
    }

    // ========================================================================
    // Diet planner
    // ========================================================================

    /// Request a fresh diet plan for the given biometrics
    ///
    /// A diet-plan request intentionally discards the prior diet-planner
    /// conversation: the history is replaced with the new request before
    /// the call. Successful plans are parsed strictly and journaled under
    /// today's date; a reply missing the expected sections is treated as a
    /// malformed response and surfaces as an error message.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for out-of-range biometrics and storage
    /// failures; remote failures become the returned error message.
    #[instrument(skip(self, input), fields(goal = ?input.goal))]
    pub async fn request_diet_plan(&self, input: &BiometricInput) -> AppResult<DietPlanOutcome> {
        let prompt_text = build_diet_prompt(input)?;

        let request = Message::new(
            MessageRole::User,
            MessageKind::DietRequest,
            Self::diet_request_summary(input),
        );
        self.diet.replace_all(vec![request])?;

        let prompt = GeneratePrompt::text(prompt_text);
        match self.dispatch(&prompt).await {
            Ok(reply) => match DietPlan::parse(&reply) {
                Ok(plan) => {
                    let message =
                        Message::new(MessageRole::Assistant, MessageKind::DietPlan, reply);
                    self.diet.append(message.clone())?;
                    self.daily.append(Utc::now().date_naive(), message.clone())?;
                    info!("diet plan generated");
                    Ok(DietPlanOutcome {
                        message,
                        plan: Some(plan),
                    })
                }
                Err(e) => {
                    let message = self.failure_message(&e);
                    self.diet.append(message.clone())?;
                    Ok(DietPlanOutcome {
                        message,
                        plan: None,
                    })
                }
            },
            Err(e) => {
                let message = self.failure_message(&e);
                self.diet.append(message.clone())?;
                Ok(DietPlanOutcome {
                    message,
                    plan: None,
                })
            }
        }
    }

    // ========================================================================
    // Injury analysis
    // ========================================================================

    /// Request an injury analysis, optionally with an inline photo
    ///
    /// The exchange is appended to the chat history with the injury
    /// message kinds; the reply is parsed strictly into an
    /// [`InjuryReport`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty description and storage
    /// failures; remote failures become the returned error message.
    #[instrument(skip(self, description, image), fields(multimodal = image.is_some()))]
    pub async fn request_injury_analysis(
        &self,
        description: &str,
        image: Option<InlineImage>,
    ) -> AppResult<InjuryOutcome> {
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input(
                "injury description must not be empty",
            ));
        }

        self.chat.append(Message::new(
            MessageRole::User,
            MessageKind::InjuryRequest,
            trimmed,
        ))?;

        let mut prompt = GeneratePrompt::text(build_injury_prompt(trimmed));
        if let Some(image) = image {
            prompt = prompt.with_image(image);
        }

        let (message, report) = match self.dispatch(&prompt).await {
            Ok(reply) => match InjuryReport::parse(&reply) {
                Ok(report) => (
                    Message::new(MessageRole::Assistant, MessageKind::InjuryAnalysis, reply),
                    Some(report),
                ),
                Err(e) => (self.failure_message(&e), None),
            },
            Err(e) => (self.failure_message(&e), None),
        };
        self.chat.append(message.clone())?;
        Ok(InjuryOutcome { message, report })
    }

    // ========================================================================
    // History access
    // ========================================================================

    /// The persisted chat history
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    pub fn chat_history(&self) -> AppResult<Vec<Message>> {
        self.chat.load()
    }

    /// The persisted diet-planner conversation
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    pub fn diet_history(&self) -> AppResult<Vec<Message>> {
        self.diet.load()
    }

    /// Diet plans journaled for one calendar day
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    pub fn plans_for(&self, day: NaiveDate) -> AppResult<Vec<Message>> {
        self.daily.messages_for(day)
    }

    /// The last observed credential validity, if any call completed yet
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    pub fn credential_status(&self) -> AppResult<Option<CredentialStatus>> {
        self.credential.load()
    }

    /// Clear the chat history
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    pub fn clear_chat_history(&self) -> AppResult<()> {
        self.chat.clear()
    }

    /// Clear the diet-planner conversation and its daily journal
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    pub fn clear_diet_history(&self) -> AppResult<()> {
        self.diet.clear()?;
        self.daily.clear()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// One generation call through the retry policy, tracking the busy
    /// flag and the credential status
    async fn dispatch(&self, prompt: &GeneratePrompt) -> AppResult<String> {
        self.busy.store(true, Ordering::SeqCst);
        let result = self.retry.run(|_| self.transport.generate(prompt)).await;
        self.busy.store(false, Ordering::SeqCst);

        let observed = match &result {
            Ok(_) => Some(true),
            Err(e) if e.code == ErrorCode::MissingCredential => Some(false),
            Err(_) => None,
        };
        if let Some(valid) = observed {
            if let Err(e) = self.credential.record(&CredentialStatus::observed(valid)) {
                warn!(error = %e, "failed to persist credential status");
            }
        }

        result
    }

    /// Synthesize the assistant-role error message for a failed call
    fn failure_message(&self, error: &AppError) -> Message {
        warn!(code = ?error.code, error = %error, "generation call failed");
        Message::from_failure(error)
    }

    fn diet_request_summary(input: &BiometricInput) -> String {
        let goal = match input.goal {
            Goal::WeightLoss => "weight loss",
            Goal::WeightGain => "weight gain",
        };
        let mut summary = format!(
            "Diet plan request: {} years, {:.1} kg, {:.1} cm, goal {goal}",
            input.age, input.weight_kg, input.height_cm
        );
        if let Some(conditions) = input
            .medical_conditions
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            summary.push_str(", conditions: ");
            summary.push_str(conditions);
        }
        summary
    }
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("retry", &self.retry)
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}
