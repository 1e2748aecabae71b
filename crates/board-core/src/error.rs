//! 리더보드 서비스의 에러 타입.
//!
//! 이 모듈은 서비스 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 서비스 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 인증 에러
    #[error("Authorization error: {0}")]
    Auth(String),

    /// 요청 한도 초과
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// 네트워크 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 타임아웃
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// 직렬화 에러
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 데이터 에러
    #[error("Data error: {0}")]
    Data(String),

    /// 찾을 수 없음
    #[error("Not found: {0}")]
    NotFound(String),

    /// 잘못된 입력
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 내부 에러
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 서비스 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_) | CoreError::RateLimit(_) | CoreError::Timeout(_)
        )
    }

    /// 작업 시작 전에 중단해야 하는 치명적인 에러인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::Config(_) | CoreError::Auth(_))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}
