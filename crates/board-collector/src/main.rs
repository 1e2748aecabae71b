//! Standalone compute job runner CLI.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use board_collector::{CollectorConfig, RunStats};
use board_core::{AppConfig, Universe};
use board_data::{RedisCache, RedisConfig, SnapshotStore, StatementClient, StatementConfig};
use board_engine::{run_compute_job, JobOptions, StatementFetcher};

#[derive(Parser)]
#[command(name = "board-collector")]
#[command(about = "MarginBoard Standalone Compute Job Runner", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 리더보드 계산 잡 단발 실행
    Compute {
        /// 특정 유니버스만 계산 (예: "NDX")
        #[arg(long)]
        universe: Option<String>,
    },

    /// 데몬 모드: 주기적으로 계산 잡 실행
    Daemon,
}

/// 잡 실행에 필요한 구성 요소.
struct JobContext {
    universes: Vec<Universe>,
    fetcher: StatementFetcher,
    store: Arc<dyn SnapshotStore>,
    options: JobOptions,
}

/// 설정에서 잡 구성 요소 조립.
async fn build_context(
    config: &CollectorConfig,
    universe_filter: Option<&str>,
) -> anyhow::Result<JobContext> {
    // 유니버스 정의는 API 서버와 동일한 설정 소스 사용
    let app_config = AppConfig::load_default().context("failed to load universe config")?;
    let universe_set = app_config
        .universe_set()
        .context("failed to build universe set")?;

    let universes: Vec<Universe> = match universe_filter {
        Some(name) => {
            let universe = universe_set
                .find(name)
                .with_context(|| format!("unknown universe: {}", name))?;
            vec![universe.clone()]
        }
        None => universe_set.all().to_vec(),
    };

    let api_key = config
        .provider
        .api_key
        .clone()
        .context("provider API key missing")?;

    let client = StatementClient::new(StatementConfig {
        base_url: config.provider.base_url.clone(),
        api_key,
        timeout_secs: config.provider.timeout_secs,
    })
    .context("failed to build provider client")?;

    let store = RedisCache::connect(&RedisConfig {
        url: config.redis_url.clone(),
    })
    .await
    .context("failed to connect to Redis")?;

    Ok(JobContext {
        universes,
        fetcher: StatementFetcher::new(client),
        store: Arc::new(store),
        options: JobOptions {
            limit: config.limit,
            parallelism: config.parallelism,
            budget: config.budget(),
        },
    })
}

/// 잡 한 번 실행 후 통계 로그 출력.
async fn run_once(context: &JobContext) -> RunStats {
    let report = run_compute_job(
        &context.universes,
        &context.fetcher,
        context.store.as_ref(),
        &context.options,
    )
    .await;

    let stats = RunStats::from_report(&report);
    stats.log_summary("리더보드 계산");
    stats
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("board_collector={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("MarginBoard Collector 시작");

    // 설정 로드 (REDIS_URL과 PROVIDER_API_KEY는 필수)
    let config = CollectorConfig::from_env()?;

    match cli.command {
        Commands::Compute { universe } => {
            let context = build_context(&config, universe.as_deref()).await?;
            run_once(&context).await;
        }
        Commands::Daemon => {
            let context = build_context(&config, None).await?;

            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let mut interval = tokio::time::interval(config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        let stats = run_once(&context).await;
                        if stats.failed > 0 {
                            tracing::warn!(failed = stats.failed, "일부 유니버스 실패, 다음 주기에 재시도");
                        }
                        tracing::info!(
                            "다음 실행: {}분 후",
                            config.daemon.interval_minutes
                        );
                    }
                }
            }
        }
    }

    tracing::info!("MarginBoard Collector 종료");

    Ok(())
}
