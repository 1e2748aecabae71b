//! 인메모리 스냅샷 스토어.
//!
//! Redis가 설정되지 않은 환경과 테스트에서 사용합니다. Redis 구현과
//! 동일하게 값을 JSON 문자열로 보관하여 직렬화 경로까지 함께 검증됩니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use board_core::Snapshot;

use crate::error::{DataError, Result};

use super::{should_replace, snapshot_key, SnapshotStore, LAST_RUN_KEY};

/// 프로세스 내 key-value 스토어.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// 빈 스토어를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(json) => {
                let parsed = serde_json::from_str(json)
                    .map_err(|e| DataError::SerializationError(e.to_string()))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| DataError::SerializationError(e.to_string()))?;
        self.entries.write().await.insert(key.to_string(), json);
        Ok(())
    }

    /// 저장된 키 개수.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// 스토어가 비어 있는지 확인.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn get_snapshot(&self, universe: &str) -> Result<Option<Snapshot>> {
        self.get(&snapshot_key(universe)).await
    }

    async fn put_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let existing: Option<Snapshot> = self.get(&snapshot_key(&snapshot.universe)).await?;
        if !should_replace(existing.as_ref(), snapshot) {
            return Ok(());
        }
        self.set(&snapshot_key(&snapshot.universe), snapshot).await
    }

    async fn get_last_run(&self) -> Result<Option<DateTime<Utc>>> {
        self.get(LAST_RUN_KEY).await
    }

    async fn set_last_run(&self, ts: DateTime<Utc>) -> Result<()> {
        self.set(LAST_RUN_KEY, &ts).await
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot_at(universe: &str, ts: i64) -> Snapshot {
        let mut snapshot = Snapshot::empty(universe);
        snapshot.updated_at = Some(Utc.timestamp_opt(ts, 0).unwrap());
        snapshot
    }

    #[tokio::test]
    async fn test_missing_keys_are_none() {
        let store = MemoryStore::new();
        assert!(store.get_snapshot("NDX").await.unwrap().is_none());
        assert!(store.get_last_run().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_and_get_snapshot_round_trip() {
        let store = MemoryStore::new();
        let snapshot = snapshot_at("NDX", 100);

        store.put_snapshot(&snapshot).await.unwrap();
        let loaded = store.get_snapshot("NDX").await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn test_back_dated_write_keeps_newer_snapshot() {
        let store = MemoryStore::new();
        store.put_snapshot(&snapshot_at("NDX", 200)).await.unwrap();
        store.put_snapshot(&snapshot_at("NDX", 100)).await.unwrap();

        let loaded = store.get_snapshot("NDX").await.unwrap().unwrap();
        assert_eq!(
            loaded.updated_at,
            Some(Utc.timestamp_opt(200, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_last_run_is_independent_of_snapshots() {
        let store = MemoryStore::new();
        let ts = Utc.timestamp_opt(300, 0).unwrap();

        store.set_last_run(ts).await.unwrap();
        assert_eq!(store.get_last_run().await.unwrap(), Some(ts));
        assert!(store.get_snapshot("NDX").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_universes_do_not_collide() {
        let store = MemoryStore::new();
        store.put_snapshot(&snapshot_at("NDX", 100)).await.unwrap();
        store.put_snapshot(&snapshot_at("DOW", 100)).await.unwrap();

        assert_eq!(store.len().await, 2);
        assert_eq!(
            store.get_snapshot("DOW").await.unwrap().unwrap().universe,
            "DOW"
        );
    }
}
