//! Profile statistics stores
//!
//! The orchestrator only pushes incremental `StatsUpdate`s; a store decides
//! how they are merged and persisted.

use super::types::{ProfileStats, StatsUpdate, UserId};
use crate::{EchoesError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Merge `update` into the user's statistics, creating them if missing
    async fn apply(&self, user: &UserId, update: StatsUpdate) -> Result<()>;

    /// Current statistics for `user`, if any session was ever recorded
    async fn load(&self, user: &UserId) -> Result<Option<ProfileStats>>;
}

/// Process-local store, shared by cloning
#[derive(Debug, Clone, Default)]
pub struct InMemoryStatsStore {
    profiles: Arc<RwLock<BTreeMap<UserId, ProfileStats>>>,
    writes: Arc<RwLock<Vec<(UserId, StatsUpdate)>>>,
}

impl InMemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every update received so far, in arrival order
    pub fn writes(&self) -> Vec<(UserId, StatsUpdate)> {
        self.writes.read().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.read().len()
    }
}

#[async_trait]
impl StatsStore for InMemoryStatsStore {
    async fn apply(&self, user: &UserId, update: StatsUpdate) -> Result<()> {
        self.profiles
            .write()
            .entry(user.clone())
            .or_default()
            .apply(&update);
        self.writes.write().push((user.clone(), update));
        Ok(())
    }

    async fn load(&self, user: &UserId) -> Result<Option<ProfileStats>> {
        Ok(self.profiles.read().get(user).cloned())
    }
}

/// Store backed by a single JSON document mapping user ids to statistics
#[derive(Debug, Clone)]
pub struct JsonFileStatsStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process
    lock: Arc<Mutex<()>>,
}

impl JsonFileStatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<UserId, ProfileStats>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                EchoesError::Store(format!("{} is not a stats document: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(EchoesError::Store(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn write_all(&self, profiles: &BTreeMap<UserId, ProfileStats>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(profiles)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StatsStore for JsonFileStatsStore {
    async fn apply(&self, user: &UserId, update: StatsUpdate) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut profiles = self.read_all().await?;
        let stats = profiles.entry(user.clone()).or_default();
        stats.apply(&update);
        debug!(
            "Stats for {}: {} sessions, {} minutes",
            user, stats.sessions_total, stats.total_minutes
        );

        self.write_all(&profiles)
            .await
            .map_err(|e| EchoesError::Store(format!("Failed to persist stats: {}", e)))?;
        info!("Persisted session stats for {} to {}", user, self.path.display());
        Ok(())
    }

    async fn load(&self, user: &UserId) -> Result<Option<ProfileStats>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn update(unique_words: usize) -> StatsUpdate {
        StatsUpdate::session(4, unique_words, NaiveDate::from_ymd_opt(2026, 5, 1).unwrap())
    }

    #[tokio::test]
    async fn test_in_memory_store_records_writes() {
        let store = InMemoryStatsStore::new();
        let user = UserId::new("u1");

        assert!(store.load(&user).await.unwrap().is_none());
        store.apply(&user, update(7)).await.unwrap();

        let stats = store.load(&user).await.unwrap().unwrap();
        assert_eq!(stats.sessions_total, 1);
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.writes()[0].0, user);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStatsStore::new(dir.path().join("nested").join("stats.json"));
        let user = UserId::new("learner");

        store.apply(&user, update(10)).await.unwrap();
        store.apply(&user, update(12)).await.unwrap();

        let reopened = JsonFileStatsStore::new(store.path().to_path_buf());
        let stats = reopened.load(&user).await.unwrap().unwrap();
        assert_eq!(stats.sessions_total, 2);
        assert_eq!(stats.total_minutes, 8);
        assert_eq!(stats.lexical_richness.len(), 2);
        assert!(reopened.load(&UserId::new("other")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStatsStore::new(path);
        let err = store.apply(&UserId::new("u"), update(1)).await.unwrap_err();
        assert!(matches!(err, EchoesError::Store(_)));
    }
}
