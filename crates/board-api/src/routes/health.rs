//! 헬스 체크 endpoint.
//!
//! 로드밸런서나 오케스트레이션 시스템에서 사용됩니다.
//! `/health`는 liveness, `/health/ready`는 구성 요소별 readiness를
//! 보고합니다.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// 전체 서비스 상태 ("healthy" | "degraded")
    pub status: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,
}

/// 개별 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    /// 캐시 스토어 연결 상태
    pub cache: ComponentStatus,
    /// 재무 데이터 제공자 설정 상태
    pub provider: ComponentStatus,
    /// 텍스트 생성 credential 풀 상태
    pub textgen: ComponentStatus,
}

/// 컴포넌트 상태 값.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    /// 정상 동작
    Up,
    /// 연결 실패
    Down,
    /// 설정되지 않음 (해당 기능 비활성)
    Disabled,
}

/// readiness 응답 구조체.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    /// 전체 서비스 상태
    pub status: String,
    /// 개별 컴포넌트 상태
    pub components: ComponentHealth,
}

/// GET /health - liveness 확인.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "서버 동작 중", body = HealthResponse)
    )
)]
pub async fn liveness(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /health/ready - 구성 요소별 readiness 확인.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "구성 요소 상태", body = ReadinessResponse)
    )
)]
pub async fn readiness(State(state): State<Arc<AppState>>) -> Json<ReadinessResponse> {
    let cache = if state.is_store_healthy().await {
        ComponentStatus::Up
    } else {
        ComponentStatus::Down
    };
    let provider = if state.has_fetcher() {
        ComponentStatus::Up
    } else {
        ComponentStatus::Disabled
    };
    let textgen = if state.has_textgen() {
        ComponentStatus::Up
    } else {
        ComponentStatus::Disabled
    };

    let status = if cache == ComponentStatus::Up {
        "healthy"
    } else {
        "degraded"
    };

    Json(ReadinessResponse {
        status: status.to_string(),
        components: ComponentHealth {
            cache,
            provider,
            textgen,
        },
    })
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(liveness))
        .route("/ready", get(readiness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;

    #[tokio::test]
    async fn test_liveness_is_always_healthy() {
        let state = Arc::new(create_test_state());
        let Json(response) = liveness(State(state)).await;

        assert_eq!(response.status, "healthy");
        assert!(response.uptime_secs >= 0);
    }

    #[tokio::test]
    async fn test_readiness_reports_disabled_components() {
        // 테스트 상태는 수집기/텍스트 생성 클라이언트 없이 구성됨
        let state = Arc::new(create_test_state());
        let Json(response) = readiness(State(state)).await;

        assert_eq!(response.status, "healthy");
        assert_eq!(response.components.cache, ComponentStatus::Up);
        assert_eq!(response.components.provider, ComponentStatus::Disabled);
        assert_eq!(response.components.textgen, ComponentStatus::Disabled);
    }
}
