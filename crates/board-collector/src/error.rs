//! 에러 타입 정의.

use std::fmt;

/// Collector 에러 타입.
#[derive(Debug)]
pub enum CollectorError {
    /// 설정 에러
    Config(String),
    /// 캐시 스토어 에러
    Cache(board_data::DataError),
    /// 일반 에러
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Cache(e) => write!(f, "Cache error: {}", e),
            Self::Other(e) => write!(f, "Error: {}", e),
        }
    }
}

impl std::error::Error for CollectorError {}

impl From<board_data::DataError> for CollectorError {
    fn from(err: board_data::DataError) -> Self {
        Self::Cache(err)
    }
}

impl From<std::env::VarError> for CollectorError {
    fn from(err: std::env::VarError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CollectorError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Other(err)
    }
}

/// Result 타입 별칭.
pub type Result<T> = std::result::Result<T, CollectorError>;
