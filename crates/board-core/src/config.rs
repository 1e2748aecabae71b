//! 설정 관리.
//!
//! 애플리케이션 설정은 프로세스 시작 시 한 번 로드되어 불변 구조체로
//! 각 컴포넌트에 명시적으로 전달됩니다. 로드 순서:
//! 기본값 → 설정 파일(선택) → `BOARD__` 접두사 환경변수 → 주요 환경변수.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::types::{Symbol, Universe, UniverseSet};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 캐시 설정
    pub cache: CacheConfig,
    /// 재무 데이터 제공자 설정
    pub provider: ProviderConfig,
    /// 리더보드 계산 설정
    pub leaderboard: LeaderboardConfig,
    /// 텍스트 생성 클라이언트 설정
    pub textgen: TextGenSettings,
    /// 계산 잡 트리거 설정
    pub cron: CronConfig,
    /// 유니버스 목록
    pub universes: Vec<UniverseConfig>,
    /// 기본 유니버스 이름
    pub default_universe: String,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 캐시 설정.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis URL (redis://host:port/db). 없으면 인메모리 스토어로 동작.
    pub redis_url: Option<String>,
}

/// 재무 데이터 제공자 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// API 키. 계산 잡 실행의 필수 전제 조건.
    pub api_key: Option<SecretString>,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://financialmodelingprep.com/api/v3".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

/// 리더보드 계산 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// 리더보드당 최대 항목 수
    pub limit: usize,
    /// 종목별 수집 동시 실행 한도
    pub parallelism: usize,
    /// 잡 전체 실행 시간 예산 (초). 0이면 무제한.
    pub budget_secs: u64,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            parallelism: 4,
            budget_secs: 120,
        }
    }
}

/// 텍스트 생성 클라이언트 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextGenSettings {
    /// chat completions 엔드포인트 URL
    pub endpoint: String,
    /// 모델 식별자
    pub model: String,
    /// credential 풀. 요청마다 섞인 순서로 소비됩니다.
    pub api_keys: Vec<SecretString>,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 응답 최대 토큰 수
    pub max_tokens: u32,
    /// 샘플링 온도
    pub temperature: f64,
}

impl Default for TextGenSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_keys: Vec::new(),
            timeout_secs: 30,
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

/// 계산 잡 트리거 설정.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CronConfig {
    /// 트리거 요청이 제시해야 하는 공유 시크릿
    pub secret: Option<SecretString>,
}

/// 유니버스 설정 항목.
#[derive(Debug, Clone, Deserialize)]
pub struct UniverseConfig {
    /// 유니버스 이름
    pub name: String,
    /// 심볼 목록 (EXCHANGE:TICKER 또는 TICKER)
    pub symbols: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            cache: CacheConfig::default(),
            provider: ProviderConfig::default(),
            leaderboard: LeaderboardConfig::default(),
            textgen: TextGenSettings::default(),
            cron: CronConfig::default(),
            universes: default_universes(),
            default_universe: "NDX".to_string(),
        }
    }
}

/// 기본 유니버스 정의.
fn default_universes() -> Vec<UniverseConfig> {
    vec![
        UniverseConfig {
            name: "NDX".to_string(),
            symbols: [
                "NASDAQ:AAPL",
                "NASDAQ:MSFT",
                "NASDAQ:NVDA",
                "NASDAQ:GOOGL",
                "NASDAQ:AMZN",
                "NASDAQ:META",
                "NASDAQ:AVGO",
                "NASDAQ:TSLA",
                "NASDAQ:COST",
                "NASDAQ:NFLX",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        },
        UniverseConfig {
            name: "DOW".to_string(),
            symbols: [
                "NYSE:UNH",
                "NYSE:GS",
                "NASDAQ:MSFT",
                "NYSE:HD",
                "NYSE:CAT",
                "NYSE:CRM",
                "NYSE:V",
                "NYSE:AXP",
                "NYSE:MCD",
                "NASDAQ:AMGN",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        },
    ]
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없어도 실패하지 않으며 기본값으로 동작합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드 (없으면 무시)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드 (BOARD__SERVER__PORT 등)
            .add_source(
                config::Environment::with_prefix("BOARD")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let mut loaded: AppConfig = config.try_deserialize()?;
        loaded.apply_env_overrides();
        Ok(loaded)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/board.toml")
    }

    /// 배포 환경에서 통용되는 주요 환경변수를 적용합니다.
    ///
    /// `REDIS_URL`, `PROVIDER_API_KEY`, `TEXTGEN_API_KEYS`(쉼표 구분),
    /// `CRON_SECRET` 등은 접두사 없이도 인식됩니다.
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_var_opt_parse("API_PORT") {
            self.server.port = port;
        }
        if let Ok(url) = std::env::var("REDIS_URL") {
            self.cache.redis_url = Some(url);
        }
        if let Ok(key) = std::env::var("PROVIDER_API_KEY") {
            self.provider.api_key = Some(key.into());
        }
        if let Ok(url) = std::env::var("PROVIDER_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Ok(keys) = std::env::var("TEXTGEN_API_KEYS") {
            self.textgen.api_keys = keys
                .split(',')
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(|k| SecretString::from(k.to_string()))
                .collect();
        }
        if let Ok(endpoint) = std::env::var("TEXTGEN_ENDPOINT") {
            self.textgen.endpoint = endpoint;
        }
        if let Ok(secret) = std::env::var("CRON_SECRET") {
            self.cron.secret = Some(secret.into());
        }
        if let Some(limit) = env_var_opt_parse("LEADERBOARD_LIMIT") {
            self.leaderboard.limit = limit;
        }
        if let Some(parallelism) = env_var_opt_parse("FETCH_PARALLELISM") {
            self.leaderboard.parallelism = parallelism;
        }
        if let Some(budget) = env_var_opt_parse("JOB_BUDGET_SECS") {
            self.leaderboard.budget_secs = budget;
        }
    }

    /// 설정에서 불변 유니버스 집합을 구성합니다.
    pub fn universe_set(&self) -> CoreResult<UniverseSet> {
        let universes: Vec<Universe> = self
            .universes
            .iter()
            .map(|u| Universe::new(&u.name, u.symbols.iter().map(|s| Symbol::new(s.as_str()))))
            .collect();

        UniverseSet::new(universes, &self.default_universe)
            .ok_or_else(|| CoreError::Config("no universes configured".to_string()))
    }
}

/// 환경변수에서 값을 파싱합니다 (실패 시 기본값 사용).
pub fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_var_opt_parse(key).unwrap_or(default)
}

/// 환경변수에서 값을 파싱합니다 (없거나 파싱 실패 시 None).
pub fn env_var_opt_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// 환경변수에서 bool 값을 파싱합니다.
pub fn env_var_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.leaderboard.limit, 10);
        assert_eq!(config.leaderboard.parallelism, 4);
        assert_eq!(config.default_universe, "NDX");
        assert_eq!(config.universes.len(), 2);
    }

    #[test]
    fn test_universe_set_from_defaults() {
        let config = AppConfig::default();
        let set = config.universe_set().unwrap();
        assert_eq!(set.default().name, "NDX");
        assert_eq!(set.resolve(Some("dow")).name, "DOW");
        // MSFT는 두 유니버스에 모두 포함됨
        assert!(set
            .find("DOW")
            .unwrap()
            .symbols
            .iter()
            .any(|s| s.ticker() == "MSFT"));
    }

    #[test]
    fn test_env_var_parse_fallback() {
        let value: u64 = env_var_parse("BOARD_TEST_MISSING_VAR", 42);
        assert_eq!(value, 42);
        assert!(env_var_bool("BOARD_TEST_MISSING_VAR", true));
    }
}
