use thiserror::Error;

use crate::csv::CsvError;
use crate::model::{AnswerError, TimerError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    Csv(#[from] CsvError),
}
