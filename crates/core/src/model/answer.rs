use thiserror::Error;

use crate::model::ids::{AnswerId, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("answer text cannot be empty")]
    EmptyText,
}

/// One recorded response in the answer log.
///
/// The text is stored verbatim (no trimming). The timestamp is an ISO-8601
/// string for fresh answers; imported rows keep their timestamp field exactly
/// as it appeared in the file, so a CSV round-trip is byte-identical.
///
/// Equality compares content (question, text, timestamp) and ignores the
/// process-local `AnswerId`, which is regenerated whenever the log is
/// rehydrated from storage.
#[derive(Debug, Clone)]
pub struct Answer {
    id: AnswerId,
    question_id: QuestionId,
    text: String,
    timestamp: String,
}

impl Answer {
    /// Records a new answer.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::EmptyText` if the text is empty or whitespace-only.
    pub fn new(
        question_id: QuestionId,
        text: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Result<Self, AnswerError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AnswerError::EmptyText);
        }
        Ok(Self {
            id: AnswerId::new(),
            question_id,
            text,
            timestamp: timestamp.into(),
        })
    }

    /// Replaces the text and refreshes the timestamp.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::EmptyText` if the new text is empty or
    /// whitespace-only; the answer is left unchanged.
    pub fn edit(
        &mut self,
        text: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Result<(), AnswerError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AnswerError::EmptyText);
        }
        self.text = text;
        self.timestamp = timestamp.into();
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> AnswerId {
        self.id
    }

    /// Referenced question id. May be dangling: answers whose question no
    /// longer resolves are kept and exported as "Unknown question".
    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

impl PartialEq for Answer {
    fn eq(&self, other: &Self) -> bool {
        self.question_id == other.question_id
            && self.text == other.text
            && self.timestamp == other.timestamp
    }
}

impl Eq for Answer {}
