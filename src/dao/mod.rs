/// JSON flat-file implementation of [`SessionRepository`].
pub mod json_file;
/// Persisted model definitions.
pub mod models;
/// Storage error types.
pub mod storage;

use futures::future::BoxFuture;

use self::{
    models::{ActiveSessions, SessionEntity},
    storage::StorageResult,
};

/// Abstraction over the durable storage of active and archived games.
pub trait SessionRepository: Send + Sync {
    /// Read the active games, returning an empty map when nothing was saved yet.
    fn load_active(&self) -> BoxFuture<'static, StorageResult<ActiveSessions>>;
    /// Replace the saved active games with `sessions`.
    fn save_active(&self, sessions: ActiveSessions) -> BoxFuture<'static, StorageResult<()>>;
    /// Append a finished game to `user`'s archive.
    fn append_archive(
        &self,
        user: String,
        session: SessionEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
}
