//! File-backed state slot: one JSON document at a fixed path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use introspect_core::model::AppState;

use crate::state_store::{StateStore, StorageError, decode_state, encode_state};

/// Stores the snapshot as a single JSON file — the desktop analogue of a
/// browser `localStorage` slot.
///
/// Reads and writes are small, local and synchronous; the async contract
/// exists so callers can treat them as single-shot completions.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn save(&self, state: &AppState) -> Result<(), StorageError> {
        let raw = encode_state(state)?;
        std::fs::write(&self.path, raw).map_err(|e| StorageError::Io(e.to_string()))
    }

    async fn load(&self) -> Result<Option<AppState>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::Io(err.to_string())),
        };
        Ok(decode_state(&raw))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err.to_string())),
        }
    }
}
