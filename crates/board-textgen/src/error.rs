//! 텍스트 생성 클라이언트 에러 타입.

use thiserror::Error;

/// 텍스트 생성 에러.
///
/// 설정 오류(`EmptyPool`)와 런타임 소진(`Exhausted`)은 호출자가 다르게
/// 처리해야 하므로 구분된 variant로 표현합니다.
#[derive(Debug, Error)]
pub enum TextGenError {
    /// credential 풀이 비어 있음 (설정 오류)
    #[error("credential pool is empty")]
    EmptyPool,

    /// 모든 credential 소진 (요청 한도 초과)
    #[error("all {attempts} credentials exhausted ({rate_limited} rate-limited)")]
    Exhausted {
        /// 시도한 credential 수
        attempts: usize,
        /// 그중 쿼터 소진으로 실패한 수
        rate_limited: usize,
    },

    /// 클라이언트 구성 오류
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TextGenError {
    /// 요청 한도 초과로 인한 실패인지 확인.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TextGenError::Exhausted { .. })
    }
}

pub type Result<T> = std::result::Result<T, TextGenError>;
