//! 스냅샷 캐시 스토어.
//!
//! 외부 key-value 서비스를 좁은 인터페이스 뒤로 감싸 계산 엔진이나
//! API 계층이 구현체를 몰라도 되게 합니다. 키가 없는 상태는 정상이며
//! (잡이 아직 실행되지 않음) `Ok(None)`으로 표현됩니다. 오류가 아닙니다.
//!
//! ## 키 형식
//! - `leaderboard:<UNIVERSE>`: 유니버스별 스냅샷
//! - `leaderboard:lastRun`: 마지막 잡 실행 시각 (유니버스와 독립)

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::{RedisCache, RedisConfig};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use board_core::Snapshot;

use crate::error::Result;

/// 마지막 잡 실행 시각 키.
pub const LAST_RUN_KEY: &str = "leaderboard:lastRun";

/// 유니버스별 스냅샷 키.
pub fn snapshot_key(universe: &str) -> String {
    format!("leaderboard:{}", universe)
}

/// 스냅샷 저장소 인터페이스.
///
/// 구현체: [`RedisCache`], [`MemoryStore`].
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 유니버스의 최신 스냅샷을 조회합니다. 없으면 `Ok(None)`.
    async fn get_snapshot(&self, universe: &str) -> Result<Option<Snapshot>>;

    /// 스냅샷을 저장합니다.
    ///
    /// 저장된 스냅샷보다 `updated_at`이 과거인 쓰기는 무시됩니다
    /// (유니버스별 `updated_at`은 단조 비감소).
    async fn put_snapshot(&self, snapshot: &Snapshot) -> Result<()>;

    /// 마지막 잡 실행 시각을 조회합니다. 없으면 `Ok(None)`.
    async fn get_last_run(&self) -> Result<Option<DateTime<Utc>>>;

    /// 마지막 잡 실행 시각을 기록합니다.
    async fn set_last_run(&self, ts: DateTime<Utc>) -> Result<()>;

    /// 저장소 연결 상태를 확인합니다.
    async fn health_check(&self) -> Result<bool>;
}

/// 저장된 스냅샷을 새 스냅샷으로 교체해야 하는지 판단.
///
/// 캐시를 과거 시점으로 되돌리는 쓰기를 거부합니다. `updated_at`이 없는
/// 새 스냅샷은 항상 기존 값을 유지합니다.
pub(crate) fn should_replace(existing: Option<&Snapshot>, incoming: &Snapshot) -> bool {
    let Some(incoming_at) = incoming.updated_at else {
        return existing.is_none();
    };

    match existing.and_then(|s| s.updated_at) {
        Some(existing_at) if incoming_at < existing_at => {
            warn!(
                universe = %incoming.universe,
                existing = %existing_at,
                incoming = %incoming_at,
                "back-dated snapshot write ignored"
            );
            false
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot_at(ts: Option<i64>) -> Snapshot {
        let mut snapshot = Snapshot::empty("NDX");
        snapshot.updated_at = ts.map(|t| Utc.timestamp_opt(t, 0).unwrap());
        snapshot
    }

    #[test]
    fn test_snapshot_key_format() {
        assert_eq!(snapshot_key("NDX"), "leaderboard:NDX");
        assert_eq!(LAST_RUN_KEY, "leaderboard:lastRun");
    }

    #[test]
    fn test_replace_when_absent() {
        assert!(should_replace(None, &snapshot_at(Some(100))));
    }

    #[test]
    fn test_replace_when_newer() {
        let existing = snapshot_at(Some(100));
        assert!(should_replace(Some(&existing), &snapshot_at(Some(200))));
        // 같은 시각도 허용 (비감소)
        assert!(should_replace(Some(&existing), &snapshot_at(Some(100))));
    }

    #[test]
    fn test_reject_back_dated_write() {
        let existing = snapshot_at(Some(200));
        assert!(!should_replace(Some(&existing), &snapshot_at(Some(100))));
    }

    #[test]
    fn test_timestampless_write_only_fills_empty_cache() {
        assert!(should_replace(None, &snapshot_at(None)));
        let existing = snapshot_at(Some(100));
        assert!(!should_replace(Some(&existing), &snapshot_at(None)));
    }
}
