use thiserror::Error;

/// Pre-flight conditions that reject a submission before any state changes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("cannot submit an empty message")]
    EmptyInput,

    #[error("a response stream is already in flight")]
    Busy,
}
