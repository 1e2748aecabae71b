//! 계산 잡 트리거 endpoint.
//!
//! 시간 기반 외부 호출자(cron invoker)가 공유 시크릿 토큰으로 호출합니다.
//! 유니버스별 부분 실패는 전송 계층에서는 성공(200)이며, 응답 본문에
//! 결과가 구분되어 담깁니다. 외부 재시도 폭주를 막기 위해 내부 오류도
//! 5xx 대신 200과 에러 본문으로 응답합니다. 401은 인증 실패에만 씁니다.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use board_engine::{run_compute_job, JobReport};

use crate::error::ApiErrorResponse;
use crate::state::AppState;

/// 트리거 쿼리.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CronQuery {
    /// 공유 시크릿 토큰
    #[serde(default)]
    pub token: Option<String>,
}

/// 트리거 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CronTriggerResponse {
    /// 실행 식별자
    pub run_id: Uuid,
    /// 캐시가 갱신된 유니버스
    pub updated: Vec<String>,
    /// 실패한 유니버스
    pub failed: Vec<String>,
    /// 실행 예산 초과로 건너뛴 유니버스
    pub skipped: Vec<String>,
    /// 실행 종료 시각 (ISO 8601)
    pub timestamp: String,
}

impl From<JobReport> for CronTriggerResponse {
    fn from(report: JobReport) -> Self {
        Self {
            run_id: report.run_id,
            updated: report.updated,
            failed: report.failed,
            skipped: report.skipped,
            timestamp: report.finished_at.to_rfc3339(),
        }
    }
}

/// GET /api/v1/cron/leaderboard - 전체 유니버스 계산 잡 실행.
#[utoipa::path(
    get,
    path = "/api/v1/cron/leaderboard",
    tag = "cron",
    params(CronQuery),
    responses(
        (status = 200, description = "잡 실행 결과 (유니버스별 부분 실패 포함)", body = CronTriggerResponse),
        (status = 401, description = "토큰 누락 또는 불일치", body = ApiErrorResponse)
    )
)]
pub async fn trigger_compute(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CronQuery>,
) -> Response {
    // 인증 실패는 어떤 부수 효과도 없이 즉시 거부
    if !state.verify_cron_token(query.token.as_deref()) {
        warn!("계산 잡 트리거 인증 실패");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiErrorResponse::new(
                "UNAUTHORIZED",
                "invalid or missing token",
            )),
        )
            .into_response();
    }

    // 제공자 credential 부재는 잡 전체의 치명적 전제 조건
    let Some(fetcher) = state.fetcher.clone() else {
        warn!("제공자 API 키 미설정, 계산 잡을 시작하지 않음");
        return (
            StatusCode::OK,
            Json(ApiErrorResponse::new(
                "PROVIDER_NOT_CONFIGURED",
                "financial data provider credential is not configured",
            )),
        )
            .into_response();
    };

    info!(universes = state.universes.all().len(), "계산 잡 트리거 수신");

    let report = run_compute_job(
        state.universes.all(),
        fetcher.as_ref(),
        state.store.as_ref(),
        &state.job_options,
    )
    .await;

    (StatusCode::OK, Json(CronTriggerResponse::from(report))).into_response()
}

/// 트리거 라우터 생성.
pub fn cron_router() -> Router<Arc<AppState>> {
    Router::new().route("/leaderboard", get(trigger_compute))
}
