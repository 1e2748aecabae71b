//! OpenAPI 문서.
//!
//! `/api-docs/openapi.json`에서 API 스펙을 제공합니다.

use axum::{routing::get, Json, Router};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::routes;
use crate::state::AppState;

/// OpenAPI 문서 정의.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MarginBoard API",
        description = "수익성 리더보드 집계 및 구조화 텍스트 생성 API"
    ),
    paths(
        routes::health::liveness,
        routes::health::readiness,
        routes::leaderboard::get_leaderboard,
        routes::cron::trigger_compute,
        routes::generate::generate_payload,
    ),
    components(schemas(
        crate::error::ApiErrorResponse,
        routes::health::HealthResponse,
        routes::health::ReadinessResponse,
        routes::health::ComponentHealth,
        routes::health::ComponentStatus,
        routes::cron::CronTriggerResponse,
        routes::generate::GenerateRequest,
        board_core::Snapshot,
        board_core::MetricSample,
        board_core::Symbol,
    )),
    tags(
        (name = "health", description = "헬스 체크"),
        (name = "leaderboard", description = "리더보드 조회"),
        (name = "cron", description = "계산 잡 트리거"),
        (name = "generate", description = "구조화 텍스트 생성")
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json 핸들러.
async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// OpenAPI 문서 라우터 생성.
pub fn openapi_router() -> Router<Arc<AppState>> {
    Router::new().route("/api-docs/openapi.json", get(serve_openapi))
}
