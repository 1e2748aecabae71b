//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/leaderboard` - 리더보드 스냅샷 조회
//! - `/api/v1/cron/leaderboard` - 계산 잡 트리거 (공유 시크릿 인증)
//! - `/api/v1/generate` - 구조화된 텍스트 생성

pub mod cron;
pub mod generate;
pub mod health;
pub mod leaderboard;

pub use cron::{cron_router, CronTriggerResponse};
pub use generate::{generate_router, GenerateRequest};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use leaderboard::{leaderboard_router, LeaderboardQuery};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // API v1 엔드포인트
        .nest("/api/v1/leaderboard", leaderboard_router())
        .nest("/api/v1/cron", cron_router())
        .nest("/api/v1/generate", generate_router())
}
