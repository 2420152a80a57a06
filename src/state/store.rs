use std::sync::Arc;

use indexmap::IndexMap;
use tracing::info;

use crate::{
    dao::{
        SessionRepository,
        models::{ActiveSessions, SessionEntity},
        storage::{StorageError, StorageResult},
    },
    services::word_source::{WordSource, WordSourceError},
    state::session::{GameSession, SessionError},
};

/// Active games keyed by user, backed by a [`SessionRepository`].
///
/// A user without an entry has no running game. The store is owned by the
/// poll loop and only ever mutated from that single task.
pub struct SessionStore {
    sessions: IndexMap<String, GameSession>,
    repository: Arc<dyn SessionRepository>,
    initial_lives: u32,
}

impl SessionStore {
    /// Load the previously persisted active games.
    ///
    /// Nothing persisted yet yields an empty store. Entries that do not
    /// describe a consistent game are reported as corrupt.
    pub async fn load(
        repository: Arc<dyn SessionRepository>,
        initial_lives: u32,
    ) -> StorageResult<Self> {
        let entities = repository.load_active().await?;
        let sessions = entities
            .into_iter()
            .map(|(user, entity)| {
                GameSession::try_from(entity)
                    .map(|session| (user.clone(), session))
                    .map_err(|err| StorageError::corrupt(format!("active game of `{user}`"), err))
            })
            .collect::<StorageResult<IndexMap<_, _>>>()?;

        info!(count = sessions.len(), "restored active games");
        Ok(Self {
            sessions,
            repository,
            initial_lives,
        })
    }

    /// Look up the running game for `user`.
    pub fn get(&self, user: &str) -> Option<&GameSession> {
        self.sessions.get(user)
    }

    /// Mutable access to the running game for `user`.
    pub fn get_mut(&mut self, user: &str) -> Option<&mut GameSession> {
        self.sessions.get_mut(user)
    }

    /// Number of running games.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no game is running.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Start a game for `user` unless one is already running.
    ///
    /// The word source is only consulted when a new game is created. The
    /// returned flag tells whether that happened.
    pub async fn start_if_absent(
        &mut self,
        user: &str,
        words: &dyn WordSource,
    ) -> Result<(&GameSession, bool), WordSourceError> {
        if self.sessions.contains_key(user) {
            return Ok((&self.sessions[user], false));
        }

        let secret = words.fetch_secret_word().await?;
        info!(user = %user, "starting new game");
        let lives = self.initial_lives;
        let session = self
            .sessions
            .entry(user.to_owned())
            .or_insert_with(|| GameSession::new(secret, lives));
        Ok((session, true))
    }

    /// Remove `user`'s game and hand back its final state for archival.
    pub fn finish(&mut self, user: &str) -> Result<GameSession, SessionError> {
        self.sessions
            .shift_remove(user)
            .ok_or_else(|| SessionError::NoActiveSession(user.to_owned()))
    }

    /// Overwrite the persisted active games with the current contents.
    pub async fn persist_active(&self) -> StorageResult<()> {
        let snapshot: ActiveSessions = self
            .sessions
            .iter()
            .map(|(user, session)| (user.clone(), SessionEntity::from(session)))
            .collect();
        self.repository.save_active(snapshot).await
    }

    /// Append a finished game to `user`'s archive.
    pub async fn archive(&self, user: &str, snapshot: &GameSession) -> StorageResult<()> {
        self.repository
            .append_archive(user.to_owned(), SessionEntity::from(snapshot))
            .await
    }
}

impl From<&GameSession> for SessionEntity {
    fn from(value: &GameSession) -> Self {
        Self {
            secret: value.secret().to_owned(),
            lives: value.lives(),
            word_state: value.word_state().to_vec(),
            mistakes: value.mistakes().to_vec(),
        }
    }
}

impl TryFrom<SessionEntity> for GameSession {
    type Error = SessionError;

    fn try_from(value: SessionEntity) -> Result<Self, Self::Error> {
        GameSession::restore(value.secret, value.lives, value.word_state, value.mistakes)
    }
}
