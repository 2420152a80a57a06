use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, time::sleep};
use tracing::{debug, info, warn};

use crate::{
    error::TurnError,
    platform::{InboxMessage, MessagingPlatform},
    services::turn_service::TurnProcessor,
    state::SessionStore,
};

/// Counters describing one pass over the inbox.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    /// Unread items fetched.
    pub fetched: usize,
    /// Items that produced a reply.
    pub replied: usize,
    /// Items whose handling failed.
    pub failed: usize,
}

/// How a single inbox item was dealt with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handled {
    Replied,
    Silent,
    Failed,
}

/// Drives the bot: poll the inbox, play every message, persist, sleep.
pub struct PollLoop {
    platform: Arc<dyn MessagingPlatform>,
    processor: TurnProcessor,
    store: SessionStore,
    bot_handle: String,
    interval: Duration,
}

impl PollLoop {
    /// Assemble the loop around an already loaded store.
    pub fn new(
        platform: Arc<dyn MessagingPlatform>,
        processor: TurnProcessor,
        store: SessionStore,
        bot_handle: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            platform,
            processor,
            store,
            bot_handle: bot_handle.into(),
            interval,
        }
    }

    /// Games currently being played.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Poll until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Shutdown is only observed between passes, never in the middle of one.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_ms = self.interval.as_millis() as u64, "polling inbox");
        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            self.run_once().await;

            tokio::select! {
                _ = sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("poll loop stopped");
    }

    /// Process every unread message once.
    ///
    /// A failing message is logged and skipped; it never holds back the rest
    /// of the batch. Every fetched message is marked read afterwards.
    pub async fn run_once(&mut self) -> PassSummary {
        let messages = match self.platform.fetch_unread().await {
            Ok(messages) => messages,
            Err(err) => {
                warn!(error = %err, "failed to fetch unread messages");
                return PassSummary::default();
            }
        };

        let mut summary = PassSummary {
            fetched: messages.len(),
            ..PassSummary::default()
        };

        for message in &messages {
            match self.process(message).await {
                Handled::Replied => summary.replied += 1,
                Handled::Silent => {}
                Handled::Failed => summary.failed += 1,
            }
        }

        if let Err(err) = self.platform.mark_read(&messages).await {
            warn!(
                error = %err,
                rejected = err.is_rejected(),
                count = messages.len(),
                "failed to mark messages read"
            );
        }

        if summary.fetched > 0 {
            debug!(
                fetched = summary.fetched,
                replied = summary.replied,
                failed = summary.failed,
                "finished inbox pass"
            );
        }
        summary
    }

    /// Handle one message and persist the active games afterwards.
    async fn process(&mut self, message: &InboxMessage) -> Handled {
        let Some(author) = message.author.as_deref() else {
            debug!(id = %message.id, "skipping message without author");
            return Handled::Silent;
        };

        let is_mention = message.is_mention_of(&self.bot_handle);
        let outcome = self
            .processor
            .handle(&mut self.store, author, &message.body, is_mention)
            .await;

        if let Err(err) = self.store.persist_active().await {
            warn!(error = %err, "failed to persist active games");
        }

        match outcome {
            Ok(Some(reply)) => match self.platform.reply(message, &reply.text).await {
                Ok(()) => {
                    debug!(user = %author, context = ?reply.context, "sent reply");
                    Handled::Replied
                }
                Err(err) => {
                    warn!(
                        user = %author,
                        error = %err,
                        rejected = err.is_rejected(),
                        "failed to send reply"
                    );
                    Handled::Failed
                }
            },
            Ok(None) => Handled::Silent,
            Err(err) if err.is_ignorable() => {
                log_turn_error(author, &message.id, &err);
                Handled::Silent
            }
            Err(err) => {
                log_turn_error(author, &message.id, &err);
                Handled::Failed
            }
        }
    }
}

fn log_turn_error(user: &str, id: &str, err: &TurnError) {
    match err {
        TurnError::NoActiveSession(_) => {
            debug!(user = %user, id = %id, "message is not a guess for a running game")
        }
        TurnError::SourceUnavailable(source) => {
            warn!(user = %user, id = %id, error = %source, "could not start game")
        }
        other => warn!(user = %user, id = %id, error = %other, "failed to handle message"),
    }
}
