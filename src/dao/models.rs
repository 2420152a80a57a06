use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Persisted shape of one Hangman game, shared by the active and archive files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SessionEntity {
    /// Word being guessed.
    pub secret: String,
    /// Remaining lives.
    pub lives: u32,
    /// One single-character string per secret letter, `_` when still hidden.
    pub word_state: Vec<char>,
    /// Incorrect guesses in guess order.
    pub mistakes: Vec<String>,
}

/// Contents of the active games file, keyed by user.
pub type ActiveSessions = IndexMap<String, SessionEntity>;

/// Contents of the archive file: every finished game per user, oldest first.
pub type ArchivedSessions = IndexMap<String, Vec<SessionEntity>>;
