use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use introspect_core::model::{
    Answer, AnswerError, AppState, QuestionId, TimerDuration, TimerError,
};

/// Errors surfaced by persistence backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Version of the persisted JSON shape. Slots written before versioning have
/// no `schemaVersion` field and read as version 1.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Persisted shape of one answer log entry.
///
/// Field names match the JSON slot format; the in-memory `AnswerId` is
/// deliberately absent and regenerated on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub text: String,
    pub timestamp: String,
}

impl AnswerRecord {
    #[must_use]
    pub fn from_answer(answer: &Answer) -> Self {
        Self {
            question_id: answer.question_id(),
            text: answer.text().to_owned(),
            timestamp: answer.timestamp().to_owned(),
        }
    }

    /// Rehydrates the domain answer, re-running its validation.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError` if the persisted text is empty.
    pub fn into_answer(self) -> Result<Answer, AnswerError> {
        Answer::new(self.question_id, self.text, self.timestamp)
    }
}

/// Errors converting a persisted record back into domain state.
///
/// Any of these marks the slot as corrupt; callers treat it as absent.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordError {
    #[error("unsupported schema version {0}")]
    UnsupportedSchema(u32),

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error(transparent)]
    Answer(#[from] AnswerError),
}

/// Persisted shape of the application snapshot.
///
/// Mirrors `AppState` so backends can serialize without leaking storage
/// concerns into the domain layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStateRecord {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub current_question_index: usize,
    pub answers: Vec<AnswerRecord>,
    pub timer_duration: u32,
}

impl AppStateRecord {
    #[must_use]
    pub fn from_state(state: &AppState) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            current_question_index: state.current_question_index,
            answers: state.answers.iter().map(AnswerRecord::from_answer).collect(),
            timer_duration: state.timer_duration.secs(),
        }
    }

    /// Converts the record back into a domain `AppState`.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` when the schema version is unknown, the timer
    /// value is not a preset, or an answer fails validation.
    pub fn into_state(self) -> Result<AppState, RecordError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(RecordError::UnsupportedSchema(self.schema_version));
        }
        let timer_duration = TimerDuration::from_secs(self.timer_duration)?;
        let answers = self
            .answers
            .into_iter()
            .map(AnswerRecord::into_answer)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AppState {
            current_question_index: self.current_question_index,
            answers,
            timer_duration,
        })
    }
}

/// Contract for the single persisted state slot.
///
/// Operations are single-shot completions on one logical thread of control;
/// only one is ever in flight per user gesture, so no ordering guarantees
/// beyond per-call atomicity are needed.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Serializes the snapshot into the slot, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    async fn save(&self, state: &AppState) -> Result<(), StorageError>;

    /// Reads the slot. Absent and corrupt content both yield `None`; corrupt
    /// content is additionally reported to the log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for real read failures, never for a
    /// missing or unparseable slot.
    async fn load(&self) -> Result<Option<AppState>, StorageError>;

    /// Deletes the slot. Clearing an already-empty slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot exists but cannot be removed.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Serializes a snapshot to the slot's JSON text.
pub(crate) fn encode_state(state: &AppState) -> Result<String, StorageError> {
    serde_json::to_string(&AppStateRecord::from_state(state))
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decodes slot content. Corrupt content is logged and treated as absent.
pub(crate) fn decode_state(raw: &str) -> Option<AppState> {
    let record: AppStateRecord = match serde_json::from_str(raw) {
        Ok(record) => record,
        Err(err) => {
            tracing::warn!(%err, "persisted state is not valid JSON, treating as absent");
            return None;
        }
    };
    match record.into_state() {
        Ok(state) => Some(state),
        Err(err) => {
            tracing::warn!(%err, "persisted state failed validation, treating as absent");
            None
        }
    }
}

/// In-memory slot for tests and prototyping.
///
/// The slot holds serialized text rather than a cloned `AppState`, so every
/// save/load exercises the same encode/decode path as the file backend.
#[derive(Clone, Default)]
pub struct InMemoryStateStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl InMemoryStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw slot content, for assertions on the persisted shape.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|guard| guard.clone())
    }

    /// Overwrites the raw slot content, bypassing serialization. Lets tests
    /// plant corrupt or legacy content.
    pub fn set_raw(&self, raw: impl Into<String>) {
        if let Ok(mut guard) = self.slot.lock() {
            *guard = Some(raw.into());
        }
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn save(&self, state: &AppState) -> Result<(), StorageError> {
        let raw = encode_state(state)?;
        let mut guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        *guard = Some(raw);
        Ok(())
    }

    async fn load(&self) -> Result<Option<AppState>, StorageError> {
        let guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(guard.as_deref().and_then(decode_state))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}
