use thiserror::Error;

use crate::{
    dao::storage::StorageError, services::word_source::WordSourceError, state::SessionError,
};

/// Errors raised while handling a single inbound message.
#[derive(Debug, Error)]
pub enum TurnError {
    /// A new game needed a word and the generator was unreachable.
    #[error("word source unavailable")]
    SourceUnavailable(#[source] WordSourceError),
    /// A guess arrived from a user without a running game.
    #[error("no active session for `{0}`")]
    NoActiveSession(String),
    /// The session rejected the guess.
    #[error("session error: {0}")]
    Session(SessionError),
    /// Reading or writing persisted games failed.
    #[error("storage error")]
    Storage(#[source] StorageError),
}

impl TurnError {
    /// Whether the message can be dropped without being treated as a failure.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, TurnError::NoActiveSession(_))
    }
}

impl From<WordSourceError> for TurnError {
    fn from(err: WordSourceError) -> Self {
        TurnError::SourceUnavailable(err)
    }
}

impl From<StorageError> for TurnError {
    fn from(err: StorageError) -> Self {
        TurnError::Storage(err)
    }
}

impl From<SessionError> for TurnError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NoActiveSession(user) => TurnError::NoActiveSession(user),
            other => TurnError::Session(other),
        }
    }
}
