//! 리더보드 조회 endpoint.
//!
//! 이 엔드포인트는 전함수(total function)입니다. 캐시가 비어 있거나
//! 스토어 장애가 있어도 항상 200과 정형 스냅샷 본문을 반환합니다.
//! 알 수 없는 유니버스 이름은 기본 유니버스로 대체됩니다.

use axum::{extract::Query, extract::State, routing::get, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::IntoParams;

use board_core::Snapshot;

use crate::state::AppState;

/// 리더보드 조회 쿼리.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LeaderboardQuery {
    /// 유니버스 이름 (대소문자 무시, 기본값: 설정된 기본 유니버스)
    #[serde(default)]
    pub universe: Option<String>,
}

/// GET /api/v1/leaderboard - 최신 리더보드 스냅샷 조회.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    tag = "leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "리더보드 스냅샷 (빈 캐시에서도 정형 응답)", body = Snapshot)
    )
)]
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Json<Snapshot> {
    let universe = state.universes.resolve(query.universe.as_deref());
    debug!(requested = ?query.universe, resolved = %universe.name, "리더보드 조회");

    // lastRun은 "잡이 한 번도 안 돌았는지"와 "돌았지만 결과가 없는지"를
    // 구분해 줌. 읽기 실패는 None으로 강등.
    let last_run = match state.store.get_last_run().await {
        Ok(last_run) => last_run,
        Err(e) => {
            warn!(error = %e, "lastRun 조회 실패");
            None
        }
    };

    let snapshot = match state.store.get_snapshot(&universe.name).await {
        Ok(Some(mut snapshot)) => {
            // 스냅샷에 시각이 없으면 lastRun으로 보정
            if snapshot.updated_at.is_none() {
                snapshot.updated_at = last_run;
            }
            snapshot
        }
        Ok(None) => {
            let mut snapshot = Snapshot::empty(&universe.name);
            snapshot.updated_at = last_run;
            snapshot
        }
        Err(e) => {
            // 스토어 장애는 호출자에게 전파하지 않고 빈 응답으로 강등
            warn!(universe = %universe.name, error = %e, "스냅샷 조회 실패, 빈 응답으로 강등");
            let mut snapshot = Snapshot::empty(&universe.name);
            snapshot.updated_at = last_run;
            snapshot
        }
    };

    Json(snapshot)
}

/// 리더보드 라우터 생성.
pub fn leaderboard_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_leaderboard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use async_trait::async_trait;
    use board_core::UNKNOWN_PERIOD;
    use board_data::{DataError, SnapshotStore};
    use chrono::{TimeZone, Utc};

    fn query(universe: Option<&str>) -> Query<LeaderboardQuery> {
        Query(LeaderboardQuery {
            universe: universe.map(|u| u.to_string()),
        })
    }

    #[tokio::test]
    async fn test_empty_cache_returns_well_formed_empty_snapshot() {
        let state = Arc::new(create_test_state());
        let Json(snapshot) = get_leaderboard(State(state), query(None)).await;

        assert_eq!(snapshot.universe, "NDX");
        assert_eq!(snapshot.period_hint, UNKNOWN_PERIOD);
        assert!(snapshot.top_net.is_empty());
        assert!(snapshot.updated_at.is_none());
        assert!(snapshot.note.is_some());
    }

    #[tokio::test]
    async fn test_unknown_universe_falls_back_to_default() {
        let state = Arc::new(create_test_state());
        let Json(snapshot) = get_leaderboard(State(state), query(Some("KOSPI"))).await;

        assert_eq!(snapshot.universe, "NDX");
    }

    #[tokio::test]
    async fn test_universe_match_is_case_insensitive() {
        let state = Arc::new(create_test_state());
        let Json(snapshot) = get_leaderboard(State(state), query(Some("dow"))).await;

        assert_eq!(snapshot.universe, "DOW");
    }

    #[tokio::test]
    async fn test_cached_snapshot_is_served() {
        let state = Arc::new(create_test_state());
        let mut cached = Snapshot::empty("NDX");
        cached.updated_at = Some(Utc.timestamp_opt(1000, 0).unwrap());
        cached.period_hint = "2025-Q2".to_string();
        state.store.put_snapshot(&cached).await.unwrap();

        let Json(snapshot) = get_leaderboard(State(state), query(Some("NDX"))).await;
        assert_eq!(snapshot.period_hint, "2025-Q2");
        assert_eq!(snapshot.updated_at, Some(Utc.timestamp_opt(1000, 0).unwrap()));
    }

    #[tokio::test]
    async fn test_missing_snapshot_uses_last_run_timestamp() {
        let state = Arc::new(create_test_state());
        let last_run = Utc.timestamp_opt(2000, 0).unwrap();
        state.store.set_last_run(last_run).await.unwrap();

        let Json(snapshot) = get_leaderboard(State(state), query(None)).await;
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.updated_at, Some(last_run));
    }

    /// 모든 호출이 실패하는 스토어.
    struct FailingStore;

    #[async_trait]
    impl SnapshotStore for FailingStore {
        async fn get_snapshot(&self, _universe: &str) -> board_data::Result<Option<Snapshot>> {
            Err(DataError::CacheError("connection refused".to_string()))
        }
        async fn put_snapshot(&self, _snapshot: &Snapshot) -> board_data::Result<()> {
            Err(DataError::CacheError("connection refused".to_string()))
        }
        async fn get_last_run(
            &self,
        ) -> board_data::Result<Option<chrono::DateTime<Utc>>> {
            Err(DataError::CacheError("connection refused".to_string()))
        }
        async fn set_last_run(&self, _ts: chrono::DateTime<Utc>) -> board_data::Result<()> {
            Err(DataError::CacheError("connection refused".to_string()))
        }
        async fn health_check(&self) -> board_data::Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_store_outage_degrades_to_empty_response() {
        let mut state = create_test_state();
        state.store = Arc::new(FailingStore);
        let state = Arc::new(state);

        let Json(snapshot) = get_leaderboard(State(state), query(None)).await;

        assert_eq!(snapshot.universe, "NDX");
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.period_hint, UNKNOWN_PERIOD);
        assert!(snapshot.note.is_some());
    }
}
