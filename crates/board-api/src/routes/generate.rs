//! 구조화된 텍스트 생성 endpoint.
//!
//! credential 로테이션 클라이언트를 통해 업스트림 completion을 호출하고
//! 추출된 JSON 페이로드를 그대로 반환합니다. 풀 전체가 소진된 경우에만
//! 429를 반환합니다.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

use board_textgen::TextGenError;

use crate::error::ApiErrorResponse;
use crate::state::AppState;

/// 생성 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// 업스트림에 전달할 프롬프트
    pub prompt: String,
}

/// POST /api/v1/generate - 구조화된 페이로드 생성.
#[utoipa::path(
    post,
    path = "/api/v1/generate",
    tag = "generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "추출된 JSON 페이로드"),
        (status = 400, description = "빈 프롬프트", body = ApiErrorResponse),
        (status = 429, description = "모든 credential 소진", body = ApiErrorResponse),
        (status = 500, description = "credential 풀 미설정", body = ApiErrorResponse)
    )
)]
pub async fn generate_payload(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    // 설정 오류는 어떤 업스트림 호출도 하기 전에 보고
    let Some(client) = state.textgen.clone() else {
        warn!("텍스트 생성 credential 풀 미설정");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse::new(
                "TEXTGEN_NOT_CONFIGURED",
                "text generation credential pool is not configured",
            )),
        )
            .into_response();
    };

    if request.prompt.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiErrorResponse::new("INVALID_INPUT", "prompt is empty")),
        )
            .into_response();
    }

    match client.generate(&request.prompt).await {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(e @ TextGenError::Exhausted { .. }) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ApiErrorResponse::new("RATE_LIMITED", e.to_string())),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse::new("TEXTGEN_ERROR", e.to_string())),
        )
            .into_response(),
    }
}

/// 생성 라우터 생성.
pub fn generate_router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(generate_payload))
}
