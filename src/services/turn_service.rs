use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{
    dao::models::SessionEntity,
    error::TurnError,
    services::{
        reply::{Reply, ReplyContext},
        word_source::WordSource,
    },
    state::{GameSession, GuessOutcome, SessionStore},
};

/// Strip all whitespace and lower-case an inbound message body.
pub fn normalize_guess(body: &str) -> String {
    let mut guess = body.to_lowercase();
    guess.retain(|c| !c.is_whitespace());
    guess
}

/// Decides what an inbound message does to the player's game.
///
/// The processor mutates the store but never persists the active set; the
/// poll loop does that after every handled message.
#[derive(Clone)]
pub struct TurnProcessor {
    words: Arc<dyn WordSource>,
    footer: Arc<str>,
}

impl TurnProcessor {
    /// Build a processor drawing new secrets from `words`.
    pub fn new(words: Arc<dyn WordSource>, footer: impl Into<String>) -> Self {
        Self {
            words,
            footer: Arc::from(footer.into()),
        }
    }

    /// Handle one message from `sender`.
    ///
    /// Mentions start a game unless one is running, in which case nothing is
    /// replied. Anything else is a guess for the sender's running game.
    pub async fn handle(
        &self,
        store: &mut SessionStore,
        sender: &str,
        body: &str,
        is_mention: bool,
    ) -> Result<Option<Reply>, TurnError> {
        if is_mention {
            return self.start(store, sender).await;
        }

        if store.get(sender).is_none() {
            return Err(TurnError::NoActiveSession(sender.to_owned()));
        }

        let guess = normalize_guess(body);
        let outcome = store
            .get_mut(sender)
            .ok_or_else(|| TurnError::NoActiveSession(sender.to_owned()))?
            .apply_guess(&guess)?;
        debug!(user = %sender, guess = %guess, ?outcome, "applied guess");

        let reply = match outcome {
            GuessOutcome::Correct => self.progress_reply(store, sender, ReplyContext::Correct)?,
            GuessOutcome::Incorrect => {
                self.progress_reply(store, sender, ReplyContext::Incorrect)?
            }
            GuessOutcome::Won => {
                let snapshot = finish_and_archive(store, sender).await?;
                Reply::render(ReplyContext::Win, &snapshot, &self.footer)
            }
            GuessOutcome::Lost => {
                let snapshot = finish_and_archive(store, sender).await?;
                Reply::render(ReplyContext::Loss, &snapshot, &self.footer)
            }
        };

        Ok(Some(reply))
    }

    fn progress_reply(
        &self,
        store: &SessionStore,
        sender: &str,
        context: ReplyContext,
    ) -> Result<Reply, TurnError> {
        let game = store
            .get(sender)
            .ok_or_else(|| TurnError::NoActiveSession(sender.to_owned()))?;
        Ok(Reply::render(context, game, &self.footer))
    }

    async fn start(
        &self,
        store: &mut SessionStore,
        sender: &str,
    ) -> Result<Option<Reply>, TurnError> {
        let (game, created) = store.start_if_absent(sender, self.words.as_ref()).await?;
        if !created {
            debug!(user = %sender, "mention from player with a running game");
            return Ok(None);
        }
        Ok(Some(Reply::render(ReplyContext::New, game, &self.footer)))
    }
}

/// Move a finished game from the active set into the archive.
///
/// The game stays finished even when archiving fails; the snapshot is logged
/// so it can be recovered by hand.
async fn finish_and_archive(
    store: &mut SessionStore,
    user: &str,
) -> Result<GameSession, TurnError> {
    let snapshot = store.finish(user)?;
    match store.archive(user, &snapshot).await {
        Ok(()) => info!(user = %user, status = ?snapshot.status(), "archived finished game"),
        Err(err) => {
            let entity = SessionEntity::from(&snapshot);
            error!(
                user = %user,
                error = %err,
                corrupt = err.is_corrupt(),
                snapshot = %serde_json::to_string(&entity).unwrap_or_default(),
                "failed to archive finished game"
            );
        }
    }
    Ok(snapshot)
}
