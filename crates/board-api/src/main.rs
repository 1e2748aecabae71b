//! 리더보드 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 리더보드 조회, 계산 잡 트리거, 텍스트 생성 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use board_api::openapi::openapi_router;
use board_api::routes::create_api_router;
use board_api::state::AppState;
use board_core::{init_logging, AppConfig, LogConfig};
use board_data::{MemoryStore, RedisCache, RedisConfig, SnapshotStore, StatementClient, StatementConfig};
use board_engine::{JobOptions, StatementFetcher};
use board_textgen::{CompletionClient, CompletionConfig};

/// 스냅샷 스토어 구성.
///
/// Redis URL이 설정되어 있으면 연결을 시도하고, 없거나 연결에 실패하면
/// 인메모리 스토어로 동작합니다 (단일 프로세스 개발 환경용).
async fn create_store(config: &AppConfig) -> Arc<dyn SnapshotStore> {
    match &config.cache.redis_url {
        Some(url) => {
            let redis_config = RedisConfig { url: url.clone() };
            match RedisCache::connect(&redis_config).await {
                Ok(cache) => {
                    info!("Redis 스냅샷 스토어 사용");
                    Arc::new(cache)
                }
                Err(e) => {
                    warn!(error = %e, "Redis 연결 실패, 인메모리 스토어로 대체합니다");
                    Arc::new(MemoryStore::new())
                }
            }
        }
        None => {
            warn!("REDIS_URL not set, using in-memory snapshot store");
            Arc::new(MemoryStore::new())
        }
    }
}

/// AppState 초기화.
async fn create_app_state(config: &AppConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let universes = config.universe_set()?;
    let store = create_store(config).await;

    let budget = match config.leaderboard.budget_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let mut state = AppState::new(universes, store).with_job_options(JobOptions {
        limit: config.leaderboard.limit,
        parallelism: config.leaderboard.parallelism,
        budget,
    });

    // 재무 데이터 제공자 (계산 잡의 필수 전제 조건)
    match &config.provider.api_key {
        Some(api_key) => {
            let client = StatementClient::new(StatementConfig {
                base_url: config.provider.base_url.clone(),
                api_key: api_key.clone(),
                timeout_secs: config.provider.timeout_secs,
            })?;
            state = state.with_fetcher(Arc::new(StatementFetcher::new(client)));
            info!("재무 데이터 제공자 클라이언트 생성 완료");
        }
        None => {
            warn!("PROVIDER_API_KEY not set, compute job will be disabled");
        }
    }

    // 텍스트 생성 credential 풀
    if config.textgen.api_keys.is_empty() {
        warn!("TEXTGEN_API_KEYS not set, text generation will be disabled");
    } else {
        let client = CompletionClient::new(
            CompletionConfig {
                endpoint: config.textgen.endpoint.clone(),
                model: config.textgen.model.clone(),
                timeout_secs: config.textgen.timeout_secs,
                max_tokens: config.textgen.max_tokens,
                temperature: config.textgen.temperature,
            },
            config.textgen.api_keys.clone(),
        )?;
        info!(pool_size = client.pool_size(), "텍스트 생성 클라이언트 생성 완료");
        state = state.with_textgen(client);
    }

    // 계산 잡 트리거 시크릿 (없으면 fail closed)
    match &config.cron.secret {
        Some(secret) => {
            state = state.with_cron_secret(secret.clone());
        }
        None => {
            warn!("CRON_SECRET not set, compute trigger will reject all requests");
        }
    }

    Ok(state)
}

/// CORS 미들웨어 구성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>) -> Router {
    create_api_router()
        .merge(openapi_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // 설정 로드
    let config = AppConfig::load_default()?;

    // tracing 초기화 (RUST_LOG가 설정 파일보다 우선)
    init_logging(LogConfig::from_settings(&config.logging))?;

    info!("Starting MarginBoard API server...");

    // AppState 생성
    let state = Arc::new(create_app_state(&config).await?);

    info!(
        universes = state.universes.all().len(),
        has_fetcher = state.has_fetcher(),
        has_textgen = state.has_textgen(),
        "Application state initialized"
    );

    // 라우터 생성
    let app = create_router(state);

    // 서버 시작
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, "API server listening");
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
