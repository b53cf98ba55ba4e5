// ABOUTME: Session store persisting ordered conversation histories across restarts
// ABOUTME: Mutations read-modify-write one slot and return the new immutable snapshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

//! # Session Store
//!
//! Persists the ordered message list of each feature under a fixed slot
//! name, serialized as a JSON array on every mutation and reloaded on
//! startup. The store is an explicit, injectable object: callers hold a
//! [`MessageStore`] rather than reaching into shared global state, and each
//! mutation returns the resulting snapshot so interleavings stay visible.
//!
//! Decode failures are logged and fail open to an empty history.

mod backend;
mod credential;
mod daily;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use credential::{CredentialStatus, CredentialStatusStore};
pub use daily::DailyMessageLog;

use std::sync::Arc;

use tracing::warn;

use crate::errors::{AppError, AppResult};
use crate::models::Message;

/// Slot name for the free-text chat history
pub const CHAT_HISTORY_SLOT: &str = "chat_history";

/// Slot name for the diet-planner conversation
pub const DIET_MESSAGES_SLOT: &str = "diet_messages";

/// Slot name for the day-keyed diet plan journal
pub const DAILY_DIET_LOG_SLOT: &str = "daily_diet_log";

/// Slot name for the remote credential status
pub const CREDENTIAL_STATUS_SLOT: &str = "credential_status";

/// Ordered message history over one storage slot
///
/// Append-only from the perspective of a single conversation turn;
/// [`MessageStore::replace_all`] exists for flows that intentionally
/// discard prior context.
#[derive(Clone)]
pub struct MessageStore {
    backend: Arc<dyn StorageBackend>,
    slot: &'static str,
}

impl MessageStore {
    /// Create a store over `slot` on the given backend
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>, slot: &'static str) -> Self {
        Self { backend, slot }
    }

    /// Load the current history
    ///
    /// A slot that was never written, or whose contents fail to decode,
    /// yields an empty list. Decode failures are logged.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only when the backend itself fails; corrupt
    /// payloads are not an error.
    pub fn load(&self) -> AppResult<Vec<Message>> {
        let Some(payload) = self.backend.read(self.slot)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&payload) {
            Ok(messages) => Ok(messages),
            Err(e) => {
                warn!(slot = self.slot, error = %e, "discarding undecodable history");
                Ok(Vec::new())
            }
        }
    }

    /// Append one message and persist, returning the new snapshot
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty-content message (the persistence
    /// invariant) or `StorageError`/`SerializationError` when persisting
    /// fails.
    pub fn append(&self, message: Message) -> AppResult<Vec<Message>> {
        if !message.is_persistable() {
            return Err(AppError::invalid_input(
                "refusing to persist a message with empty content",
            ));
        }
        let mut messages = self.load()?;
        messages.push(message);
        self.persist(&messages)?;
        Ok(messages)
    }

    /// Replace the whole history and persist, returning the new snapshot
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when any message has empty content, or a
    /// storage/serialization error when persisting fails.
    pub fn replace_all(&self, messages: Vec<Message>) -> AppResult<Vec<Message>> {
        if messages.iter().any(|m| !m.is_persistable()) {
            return Err(AppError::invalid_input(
                "refusing to persist a message with empty content",
            ));
        }
        self.persist(&messages)?;
        Ok(messages)
    }

    /// Remove the history slot entirely
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    pub fn clear(&self) -> AppResult<()> {
        self.backend.remove(self.slot)
    }

    fn persist(&self, messages: &[Message]) -> AppResult<()> {
        let payload = serde_json::to_string(messages)
            .map_err(|e| AppError::serialization(format!("failed to encode history: {e}")))?;
        self.backend.write(self.slot, &payload)
    }
}

impl std::fmt::Debug for MessageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStore")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;

    fn memory_store() -> MessageStore {
        MessageStore::new(Arc::new(MemoryBackend::new()), CHAT_HISTORY_SLOT)
    }

    #[test]
    fn test_append_returns_growing_snapshots() {
        let store = memory_store();
        let first = store.append(Message::user_chat("hello")).unwrap();
        assert_eq!(first.len(), 1);
        let second = store.append(Message::assistant_chat("hi there")).unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].content, "hello");
        assert_eq!(second[1].content, "hi there");
    }

    #[test]
    fn test_empty_content_rejected() {
        let store = memory_store();
        let err = store.append(Message::user_chat("  ")).unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::InvalidInput);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_payload_fails_open() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write(CHAT_HISTORY_SLOT, "{not json").unwrap();
        let store = MessageStore::new(backend, CHAT_HISTORY_SLOT);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_replace_all_discards_previous_history() {
        let store = memory_store();
        store.append(Message::user_chat("old turn")).unwrap();
        let snapshot = store
            .replace_all(vec![Message::user_chat("fresh start")])
            .unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.load().unwrap()[0].content, "fresh start");
    }

    #[test]
    fn test_clear_then_load_is_empty() {
        let store = memory_store();
        store.append(Message::user_chat("hello")).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
