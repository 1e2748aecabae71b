//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.
//! 구성 요소는 프로세스 시작 시 한 번 조립되며 이후 불변입니다.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use board_core::UniverseSet;
use board_data::SnapshotStore;
use board_engine::{JobOptions, MetricFetcher};
use board_textgen::CompletionClient;

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 설정된 유니버스 집합 (불변)
    pub universes: Arc<UniverseSet>,

    /// 스냅샷 캐시 스토어 (Redis 또는 인메모리)
    pub store: Arc<dyn SnapshotStore>,

    /// 지표 수집기. 제공자 API 키가 없으면 None이며 계산 잡이 비활성화됩니다.
    pub fetcher: Option<Arc<dyn MetricFetcher>>,

    /// 텍스트 생성 클라이언트. credential 풀이 없으면 None.
    pub textgen: Option<Arc<CompletionClient>>,

    /// 계산 잡 트리거용 공유 시크릿. 없으면 트리거는 항상 거부됩니다.
    cron_secret: Option<SecretString>,

    /// 계산 잡 옵션
    pub job_options: JobOptions,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(universes: UniverseSet, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            universes: Arc::new(universes),
            store,
            fetcher: None,
            textgen: None,
            cron_secret: None,
            job_options: JobOptions::default(),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 지표 수집기 설정.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn MetricFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// 텍스트 생성 클라이언트 설정.
    pub fn with_textgen(mut self, client: CompletionClient) -> Self {
        self.textgen = Some(Arc::new(client));
        self
    }

    /// 계산 잡 트리거 시크릿 설정.
    pub fn with_cron_secret(mut self, secret: SecretString) -> Self {
        self.cron_secret = Some(secret);
        self
    }

    /// 계산 잡 옵션 설정.
    pub fn with_job_options(mut self, options: JobOptions) -> Self {
        self.job_options = options;
        self
    }

    /// 트리거 토큰 검증.
    ///
    /// 시크릿이 설정되지 않았으면 항상 거부합니다 (fail closed).
    pub fn verify_cron_token(&self, token: Option<&str>) -> bool {
        match (&self.cron_secret, token) {
            (Some(secret), Some(token)) => secret.expose_secret() == token,
            _ => false,
        }
    }

    /// 지표 수집기 설정 여부 확인.
    pub fn has_fetcher(&self) -> bool {
        self.fetcher.is_some()
    }

    /// 텍스트 생성 클라이언트 설정 여부 확인.
    pub fn has_textgen(&self) -> bool {
        self.textgen.is_some()
    }

    /// 캐시 스토어 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        self.store.health_check().await.unwrap_or(false)
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 인메모리 스토어와 고정 시크릿("test-secret")으로 구성된 최소 상태를
/// 생성합니다. 수집기와 텍스트 생성 클라이언트는 포함되지 않습니다.
#[cfg(test)]
pub fn create_test_state() -> AppState {
    use board_core::{Symbol, Universe};
    use board_data::MemoryStore;

    let universes = UniverseSet::new(
        vec![
            Universe::new("NDX", ["AAPL", "MSFT"].map(Symbol::new)),
            Universe::new("DOW", ["UNH"].map(Symbol::new)),
        ],
        "NDX",
    )
    .expect("test universes must not be empty");

    AppState::new(universes, Arc::new(MemoryStore::new()))
        .with_cron_secret(SecretString::from("test-secret".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_cron_token() {
        let state = create_test_state();
        assert!(state.verify_cron_token(Some("test-secret")));
        assert!(!state.verify_cron_token(Some("wrong")));
        assert!(!state.verify_cron_token(None));
    }

    #[test]
    fn test_missing_secret_fails_closed() {
        let state = create_test_state();
        let mut state = state;
        state.cron_secret = None;
        assert!(!state.verify_cron_token(Some("anything")));
    }
}
