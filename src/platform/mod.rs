/// Reddit inbox client.
pub mod reddit;

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

/// Result alias for messaging platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Error raised by messaging platform clients regardless of the backend.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The platform could not be reached or answered with something unreadable.
    #[error("could not reach messaging platform: {message}")]
    Transport {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The platform answered but refused the request.
    #[error("messaging platform refused the request: {message}")]
    Rejected { message: String },
}

impl PlatformError {
    /// Wrap a network, TLS or decoding failure.
    pub fn transport(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        PlatformError::Transport {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Report a request the platform answered with an error.
    pub fn rejected(message: impl Into<String>) -> Self {
        PlatformError::Rejected {
            message: message.into(),
        }
    }

    /// Whether the platform itself refused the request.
    pub fn is_rejected(&self) -> bool {
        matches!(self, PlatformError::Rejected { .. })
    }
}

/// One unread inbox item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxMessage {
    /// Platform identifier used to reply and mark the item read.
    pub id: String,
    /// Sender name, absent when the account was deleted.
    pub author: Option<String>,
    /// Raw message text.
    pub body: String,
}

impl InboxMessage {
    /// Whether the message addresses the bot by `handle`.
    pub fn is_mention_of(&self, handle: &str) -> bool {
        self.body.contains(handle)
    }
}

/// Inbox operations the poll loop needs from the messaging platform.
pub trait MessagingPlatform: Send + Sync {
    /// Fetch every unread inbox item in the order the platform lists them.
    fn fetch_unread(&self) -> BoxFuture<'_, PlatformResult<Vec<InboxMessage>>>;
    /// Mark the given items as read.
    fn mark_read<'a>(&'a self, messages: &'a [InboxMessage]) -> BoxFuture<'a, PlatformResult<()>>;
    /// Post `text` as a reply to `message`.
    fn reply<'a>(
        &'a self,
        message: &'a InboxMessage,
        text: &'a str,
    ) -> BoxFuture<'a, PlatformResult<()>>;
}
