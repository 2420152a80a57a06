use std::{
    ffi::OsString,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

use super::{
    SessionRepository,
    models::{ActiveSessions, ArchivedSessions, SessionEntity},
    storage::{StorageError, StorageResult},
};

/// Stores active and archived games as two JSON objects on disk.
///
/// Both files are rewritten as a whole on every save. Writes go to a sibling
/// `.tmp` file first and are then renamed over the target, so a crash leaves
/// either the previous or the new contents in place.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    active_path: Arc<Path>,
    archive_path: Arc<Path>,
}

impl JsonFileRepository {
    /// Build a repository over the given active and archive files.
    pub fn new(active_path: impl Into<PathBuf>, archive_path: impl Into<PathBuf>) -> Self {
        Self {
            active_path: Arc::from(active_path.into()),
            archive_path: Arc::from(archive_path.into()),
        }
    }

    /// Location of the active games file.
    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    /// Location of the archive file.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }
}

impl SessionRepository for JsonFileRepository {
    fn load_active(&self) -> BoxFuture<'static, StorageResult<ActiveSessions>> {
        let path = self.active_path.clone();
        Box::pin(async move {
            let sessions = read_json::<ActiveSessions>(&path).await?.unwrap_or_default();
            debug!(path = %path.display(), count = sessions.len(), "loaded active games");
            Ok(sessions)
        })
    }

    fn save_active(&self, sessions: ActiveSessions) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.active_path.clone();
        Box::pin(async move { write_json_atomic(&path, &sessions).await })
    }

    fn append_archive(
        &self,
        user: String,
        session: SessionEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.archive_path.clone();
        Box::pin(async move {
            // A corrupt archive aborts here, before anything is written back.
            let mut archive = read_json::<ArchivedSessions>(&path)
                .await?
                .unwrap_or_default();
            archive.entry(user).or_default().push(session);
            write_json_atomic(&path, &archive).await
        })
    }
}

async fn read_json<T>(path: &Path) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
{
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| StorageError::corrupt(path.display().to_string(), err)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StorageError::io(path, err)),
    }
}

async fn write_json_atomic<T>(path: &Path, value: &T) -> StorageResult<()>
where
    T: ?Sized + Serialize,
{
    let payload =
        serde_json::to_vec(value).map_err(|err| StorageError::io(path, io::Error::other(err)))?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|err| StorageError::io(parent, err))?;
    }

    let temp = temp_path(path);
    let mut file = fs::File::create(&temp)
        .await
        .map_err(|err| StorageError::io(&temp, err))?;
    file.write_all(&payload)
        .await
        .map_err(|err| StorageError::io(&temp, err))?;
    file.sync_all()
        .await
        .map_err(|err| StorageError::io(&temp, err))?;
    drop(file);

    fs::rename(&temp, path)
        .await
        .map_err(|err| StorageError::io(path, err))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("sessions"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(secret: &str) -> SessionEntity {
        SessionEntity {
            secret: secret.into(),
            lives: 5,
            word_state: vec!['_'; secret.len()],
            mistakes: Vec::new(),
        }
    }

    fn repository(dir: &tempfile::TempDir) -> JsonFileRepository {
        JsonFileRepository::new(
            dir.path().join("data/active_games.json"),
            dir.path().join("data/archived_games.json"),
        )
    }

    #[tokio::test]
    async fn missing_active_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = repository(&dir).load_active().await.unwrap();
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn save_active_overwrites_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(&dir);

        let mut sessions = ActiveSessions::new();
        sessions.insert("alice".into(), entity("kite"));
        sessions.insert("bob".into(), entity("lamp"));
        repo.save_active(sessions).await.unwrap();

        let mut sessions = ActiveSessions::new();
        sessions.insert("bob".into(), entity("lamp"));
        repo.save_active(sessions.clone()).await.unwrap();

        assert_eq!(repo.load_active().await.unwrap(), sessions);
        assert!(!temp_path(repo.active_path()).exists());
    }

    #[tokio::test]
    async fn active_file_uses_plain_json_shape() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(&dir);

        let mut sessions = ActiveSessions::new();
        sessions.insert(
            "alice".into(),
            SessionEntity {
                secret: "kite".into(),
                lives: 4,
                word_state: vec!['k', '_', '_', '_'],
                mistakes: vec!["x".into()],
            },
        );
        repo.save_active(sessions).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(repo.active_path()).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({
                "alice": {
                    "secret": "kite",
                    "lives": 4,
                    "word_state": ["k", "_", "_", "_"],
                    "mistakes": ["x"]
                }
            })
        );
    }

    #[tokio::test]
    async fn unknown_fields_are_reported_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(&dir);
        std::fs::create_dir_all(repo.active_path().parent().unwrap()).unwrap();
        std::fs::write(
            repo.active_path(),
            r#"{"alice":{"secret":"kite","lives":5,"word_state":["_","_","_","_"],"mistakes":[],"score":3}}"#,
        )
        .unwrap();

        let err = repo.load_active().await.unwrap_err();
        assert!(err.is_corrupt());
    }

    #[tokio::test]
    async fn archive_appends_in_order_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(&dir);

        repo.append_archive("alice".into(), entity("kite")).await.unwrap();
        repo.append_archive("bob".into(), entity("lamp")).await.unwrap();
        repo.append_archive("alice".into(), entity("rope")).await.unwrap();

        let archive: ArchivedSessions =
            serde_json::from_slice(&std::fs::read(repo.archive_path()).unwrap()).unwrap();
        let alice: Vec<_> = archive["alice"].iter().map(|s| s.secret.as_str()).collect();
        assert_eq!(alice, ["kite", "rope"]);
        assert_eq!(archive["bob"], vec![entity("lamp")]);
    }

    #[tokio::test]
    async fn corrupt_archive_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(&dir);
        std::fs::create_dir_all(repo.archive_path().parent().unwrap()).unwrap();
        std::fs::write(repo.archive_path(), "[1, 2, 3]").unwrap();

        let err = repo
            .append_archive("alice".into(), entity("kite"))
            .await
            .unwrap_err();
        assert!(err.is_corrupt());
        assert_eq!(std::fs::read_to_string(repo.archive_path()).unwrap(), "[1, 2, 3]");
    }
}
