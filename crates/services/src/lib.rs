#![forbid(unsafe_code)]

pub mod error;
pub mod session_service;

pub use introspect_core::Clock;

pub use error::SessionError;
pub use session_service::{
    Advance, AnswerGroup, AnswerOutcome, ImportSummary, SessionProgress, SessionService,
};
