// ABOUTME: Persisted record of the last-known validity of the remote API credential
// ABOUTME: Updated after every generation call so the UI can warn before going online
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{AppError, AppResult};

use super::StorageBackend;

/// Last observed validity of the remote credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialStatus {
    /// Whether the last generation call authenticated successfully
    pub valid: bool,
    /// When the observation was made
    pub checked_at: DateTime<Utc>,
}

impl CredentialStatus {
    /// Record an observation made now
    #[must_use]
    pub fn observed(valid: bool) -> Self {
        Self {
            valid,
            checked_at: Utc::now(),
        }
    }
}

/// Store for the credential status slot
#[derive(Clone)]
pub struct CredentialStatusStore {
    backend: Arc<dyn StorageBackend>,
    slot: &'static str,
}

impl CredentialStatusStore {
    /// Create a store over `slot` on the given backend
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>, slot: &'static str) -> Self {
        Self { backend, slot }
    }

    /// Load the last recorded status, `None` when never recorded
    ///
    /// Undecodable payloads fail open to `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    pub fn load(&self) -> AppResult<Option<CredentialStatus>> {
        let Some(payload) = self.backend.read(self.slot)? else {
            return Ok(None);
        };
        match serde_json::from_str(&payload) {
            Ok(status) => Ok(Some(status)),
            Err(e) => {
                warn!(slot = self.slot, error = %e, "discarding undecodable credential status");
                Ok(None)
            }
        }
    }

    /// Persist a new observation
    ///
    /// # Errors
    ///
    /// Returns a storage/serialization error when persisting fails.
    pub fn record(&self, status: &CredentialStatus) -> AppResult<()> {
        let payload = serde_json::to_string(status).map_err(|e| {
            AppError::serialization(format!("failed to encode credential status: {e}"))
        })?;
        self.backend.write(self.slot, &payload)
    }
}

impl std::fmt::Debug for CredentialStatusStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStatusStore")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}
