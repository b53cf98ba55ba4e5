// ABOUTME: Day-keyed message journal mapping calendar days to message lists
// ABOUTME: Backs the diet planner's per-day plan archive under a single slot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::warn;

use crate::errors::{AppError, AppResult};
use crate::models::Message;

use super::StorageBackend;

/// Day -> message list mapping persisted under a single slot
///
/// The diet planner journals each generated plan under the calendar day it
/// was produced, so "today's plan" survives restarts independently of the
/// conversation slot. Same snapshot and fail-open semantics as
/// [`super::MessageStore`].
#[derive(Clone)]
pub struct DailyMessageLog {
    backend: Arc<dyn StorageBackend>,
    slot: &'static str,
}

impl DailyMessageLog {
    /// Create a log over `slot` on the given backend
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>, slot: &'static str) -> Self {
        Self { backend, slot }
    }

    /// Load the full day-keyed mapping, failing open on decode errors
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only when the backend fails.
    pub fn load(&self) -> AppResult<BTreeMap<NaiveDate, Vec<Message>>> {
        let Some(payload) = self.backend.read(self.slot)? else {
            return Ok(BTreeMap::new());
        };
        match serde_json::from_str(&payload) {
            Ok(days) => Ok(days),
            Err(e) => {
                warn!(slot = self.slot, error = %e, "discarding undecodable daily log");
                Ok(BTreeMap::new())
            }
        }
    }

    /// Messages journaled for one day, empty when none
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    pub fn messages_for(&self, day: NaiveDate) -> AppResult<Vec<Message>> {
        Ok(self.load()?.remove(&day).unwrap_or_default())
    }

    /// Append a message under `day` and persist, returning that day's snapshot
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for empty content, or a storage/serialization
    /// error when persisting fails.
    pub fn append(&self, day: NaiveDate, message: Message) -> AppResult<Vec<Message>> {
        if !message.is_persistable() {
            return Err(AppError::invalid_input(
                "refusing to persist a message with empty content",
            ));
        }
        let mut days = self.load()?;
        let entry = days.entry(day).or_default();
        entry.push(message);
        let snapshot = entry.clone();
        let payload = serde_json::to_string(&days)
            .map_err(|e| AppError::serialization(format!("failed to encode daily log: {e}")))?;
        self.backend.write(self.slot, &payload)?;
        Ok(snapshot)
    }

    /// Remove the whole journal
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    pub fn clear(&self) -> AppResult<()> {
        self.backend.remove(self.slot)
    }
}

impl std::fmt::Debug for DailyMessageLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyMessageLog")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}
