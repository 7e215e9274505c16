//! Shared error types for the services crate.

use thiserror::Error;

use introspect_core::csv::CsvError;
use introspect_core::model::AnswerError;
use storage::state_store::StorageError;

/// Errors emitted by `SessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no answer with the given id")]
    AnswerNotFound,

    #[error(transparent)]
    Answer(#[from] AnswerError),

    #[error(transparent)]
    Csv(#[from] CsvError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
