#![forbid(unsafe_code)]

pub mod json_file;
pub mod state_store;

pub use json_file::JsonFileStore;
pub use state_store::{
    AnswerRecord, AppStateRecord, InMemoryStateStore, SCHEMA_VERSION, StateStore, StorageError,
};
