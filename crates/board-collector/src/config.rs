//! 환경변수 기반 설정 모듈.

use std::time::Duration;

use secrecy::SecretString;

use board_core::{env_var_parse, ProviderConfig};

use crate::error::CollectorError;
use crate::Result;

/// Collector 전체 설정.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Redis URL
    pub redis_url: String,
    /// 재무 데이터 제공자 설정
    pub provider: ProviderConfig,
    /// 리더보드당 최대 항목 수
    pub limit: usize,
    /// 종목별 수집 동시 실행 한도
    pub parallelism: usize,
    /// 잡 전체 실행 시간 예산 (초). 0이면 무제한.
    pub budget_secs: u64,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 데몬 모드 설정.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 잡 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드.
    ///
    /// `REDIS_URL`과 `PROVIDER_API_KEY`는 필수입니다. 계산 결과를 기록할
    /// 곳과 제공자 credential 없이는 잡을 시작할 수 없습니다.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let redis_url = std::env::var("REDIS_URL").map_err(|_| {
            CollectorError::Config("REDIS_URL environment variable is not set".to_string())
        })?;

        let api_key: SecretString = std::env::var("PROVIDER_API_KEY")
            .map_err(|_| {
                CollectorError::Config(
                    "PROVIDER_API_KEY environment variable is not set".to_string(),
                )
            })?
            .into();

        let provider_defaults = ProviderConfig::default();

        Ok(Self {
            redis_url,
            provider: ProviderConfig {
                base_url: std::env::var("PROVIDER_BASE_URL")
                    .unwrap_or(provider_defaults.base_url),
                api_key: Some(api_key),
                timeout_secs: env_var_parse(
                    "PROVIDER_TIMEOUT_SECS",
                    provider_defaults.timeout_secs,
                ),
            },
            limit: env_var_parse("LEADERBOARD_LIMIT", 10),
            parallelism: env_var_parse("FETCH_PARALLELISM", 4),
            budget_secs: env_var_parse("JOB_BUDGET_SECS", 120),
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 60),
            },
        })
    }

    /// 실행 시간 예산을 Duration으로 반환. 0이면 None.
    pub fn budget(&self) -> Option<Duration> {
        match self.budget_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl DaemonConfig {
    /// 잡 실행 주기를 Duration으로 반환.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}
