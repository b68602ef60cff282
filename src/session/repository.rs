use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::game::SessionSnapshot;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid session id: {0:?}")]
    InvalidId(String),
}

/// Where session snapshots live between requests and restarts.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<SessionSnapshot>, StoreError>;
    async fn save(&self, session_id: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError>;
    async fn remove(&self, session_id: &str) -> Result<(), StoreError>;
}

/// Keeps snapshots for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: RwLock<HashMap<String, SessionSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with snapshots, keyed by session id
    pub fn with_snapshots(snapshots: Vec<(String, SessionSnapshot)>) -> Self {
        Self {
            snapshots: RwLock::new(snapshots.into_iter().collect()),
        }
    }

    pub async fn snapshot_count(&self) -> usize {
        self.snapshots.read().await.len()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(session_id.to_string(), snapshot.clone());
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.remove(session_id);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    saved_at: DateTime<Utc>,
    snapshot: SessionSnapshot,
}

/// One pretty-printed JSON file per session inside a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, session_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !session_id.is_empty()
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId(session_id.to_string()));
        }
        Ok(self.dir.join(format!("{session_id}.json")))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn load(&self, session_id: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        let path = self.path_for(session_id)?;
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot on disk");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSnapshot = serde_json::from_str(&contents)?;
        debug!(saved_at = %stored.saved_at, "Snapshot read from disk");
        Ok(Some(stored.snapshot))
    }

    #[instrument(skip(self, snapshot), fields(dir = %self.dir.display()))]
    async fn save(&self, session_id: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let path = self.path_for(session_id)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let stored = StoredSnapshot {
            saved_at: Utc::now(),
            snapshot: snapshot.clone(),
        };
        let json = serde_json::to_string_pretty(&stored)?;

        // Write then rename so a crash never leaves a half-written snapshot.
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        debug!(rounds = snapshot.rounds.len(), "Snapshot written to disk");
        Ok(())
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn remove(&self, session_id: &str) -> Result<(), StoreError> {
        let path = self.path_for(session_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
