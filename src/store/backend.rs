// ABOUTME: Durable key-value slot abstraction with file-backed and in-memory implementations
// ABOUTME: Each slot holds one JSON blob; the file backend writes via temp-file rename
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

//! # Storage Backends
//!
//! The assistant persists each feature's state under a fixed slot name:
//! one JSON blob per slot. [`StorageBackend`] abstracts where those slots
//! live so the stores can be exercised against an in-memory map in tests
//! and a data directory in production.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::{AppError, AppResult};

/// Durable key-value slots holding one JSON payload each
pub trait StorageBackend: Send + Sync {
    /// Read a slot's payload, `None` when the slot has never been written
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the underlying medium fails.
    fn read(&self, slot: &str) -> AppResult<Option<String>>;

    /// Write a slot's payload, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the underlying medium fails.
    fn write(&self, slot: &str, payload: &str) -> AppResult<()>;

    /// Remove a slot entirely; removing an absent slot is not an error
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the underlying medium fails.
    fn remove(&self, slot: &str) -> AppResult<()>;
}

/// File-per-slot backend rooted at a data directory
///
/// Writes go to a sibling temp file first and are moved into place, so a
/// crash mid-write leaves the previous payload intact.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            AppError::storage(format!("failed to create data directory {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, slot: &str) -> AppResult<Option<String>> {
        let path = self.slot_path(slot);
        match fs::read_to_string(&path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn write(&self, slot: &str, payload: &str) -> AppResult<()> {
        let path = self.slot_path(slot);
        let tmp = self.dir.join(format!("{slot}.json.tmp"));
        fs::write(&tmp, payload)
            .map_err(|e| AppError::storage(format!("failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .map_err(|e| AppError::storage(format!("failed to commit {}: {e}", path.display())))
    }

    fn remove(&self, slot: &str) -> AppResult<()> {
        let path = self.slot_path(slot);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::storage(format!(
                "failed to remove {}: {e}",
                path.display()
            ))),
        }
    }
}

impl AsRef<Path> for FileBackend {
    fn as_ref(&self) -> &Path {
        &self.dir
    }
}

/// In-memory backend for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, slot: &str) -> AppResult<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| AppError::storage("memory backend lock poisoned"))?;
        Ok(slots.get(slot).cloned())
    }

    fn write(&self, slot: &str, payload: &str) -> AppResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| AppError::storage("memory backend lock poisoned"))?;
        slots.insert(slot.to_owned(), payload.to_owned());
        Ok(())
    }

    fn remove(&self, slot: &str) -> AppResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| AppError::storage("memory backend lock poisoned"))?;
        slots.remove(slot);
        Ok(())
    }
}
