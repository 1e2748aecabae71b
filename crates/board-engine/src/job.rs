//! 전체 유니버스 계산 잡.
//!
//! HTTP 트리거와 standalone collector가 공유하는 오케스트레이션입니다.
//! 유니버스는 순차 처리되며, 한 유니버스의 계산/캐시 실패는 나머지
//! 유니버스 처리를 막지 않습니다. 실행 시간 예산을 초과하면 남은
//! 유니버스는 이번 실행에서 건너뛰고(다음 실행에서 처리) 이미 기록된
//! 스냅샷은 그대로 유지됩니다.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use board_core::Universe;
use board_data::SnapshotStore;

use crate::compute::compute_leaderboard;
use crate::fetcher::MetricFetcher;

/// 잡 실행 옵션.
#[derive(Debug, Clone)]
pub struct JobOptions {
    /// 리더보드당 최대 항목 수
    pub limit: usize,
    /// 종목별 수집 동시 실행 한도
    pub parallelism: usize,
    /// 전체 실행 시간 예산. None이면 무제한.
    pub budget: Option<Duration>,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            parallelism: 4,
            budget: Some(Duration::from_secs(120)),
        }
    }
}

/// 잡 실행 보고서.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    /// 실행 식별자
    pub run_id: Uuid,
    /// 캐시가 갱신된 유니버스
    pub updated: Vec<String>,
    /// 실패한 유니버스
    pub failed: Vec<String>,
    /// 예산 초과로 건너뛴 유니버스
    pub skipped: Vec<String>,
    /// 실행 시작 시각
    pub started_at: DateTime<Utc>,
    /// 실행 종료 시각
    pub finished_at: DateTime<Utc>,
}

impl JobReport {
    /// 처리된 유니버스 수.
    pub fn total(&self) -> usize {
        self.updated.len() + self.failed.len() + self.skipped.len()
    }
}

/// 설정된 모든 유니버스의 리더보드를 계산하고 캐시에 기록합니다.
///
/// 제공자 credential이 없는 경우는 이 함수 호출 전에 걸러져야 합니다
/// (전체 잡의 치명적 전제 조건). 개별 유니버스의 실패는 복구 가능하며
/// 보고서에 구분되어 담깁니다. 모든 유니버스 처리 후 lastRun 시각을
/// 한 번 기록합니다.
pub async fn run_compute_job(
    universes: &[Universe],
    fetcher: &dyn MetricFetcher,
    store: &dyn SnapshotStore,
    options: &JobOptions,
) -> JobReport {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let started = Instant::now();
    let deadline = options.budget.map(|budget| started + budget);

    info!(
        run_id = %run_id,
        universes = universes.len(),
        limit = options.limit,
        parallelism = options.parallelism,
        "계산 잡 시작"
    );

    let mut updated = Vec::new();
    let mut failed = Vec::new();
    let mut skipped = Vec::new();

    for universe in universes {
        // 예산 확인: 초과 시 남은 유니버스는 다음 실행으로 미룸
        let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
        if let Some(remaining) = remaining {
            if remaining.is_zero() {
                warn!(run_id = %run_id, universe = %universe.name, "실행 예산 소진, 건너뜀");
                skipped.push(universe.name.clone());
                continue;
            }
        }

        let compute = compute_leaderboard(
            &universe.name,
            &universe.symbols,
            options.limit,
            fetcher,
            options.parallelism,
        );

        // 남은 예산 안에서만 계산 허용
        let result = match remaining {
            Some(remaining) => match tokio::time::timeout(remaining, compute).await {
                Ok(result) => result,
                Err(_) => {
                    error!(run_id = %run_id, universe = %universe.name, "유니버스 계산이 예산을 초과함");
                    failed.push(universe.name.clone());
                    continue;
                }
            },
            None => compute.await,
        };

        match result {
            Ok(snapshot) => match store.put_snapshot(&snapshot).await {
                Ok(()) => updated.push(universe.name.clone()),
                Err(e) => {
                    error!(run_id = %run_id, universe = %universe.name, error = %e, "스냅샷 캐시 기록 실패");
                    failed.push(universe.name.clone());
                }
            },
            Err(e) => {
                error!(run_id = %run_id, universe = %universe.name, error = %e, "리더보드 계산 실패");
                failed.push(universe.name.clone());
            }
        }
    }

    // 유니버스별 스냅샷과 독립된 단일 lastRun 기록
    let finished_at = Utc::now();
    if let Err(e) = store.set_last_run(finished_at).await {
        error!(run_id = %run_id, error = %e, "lastRun 기록 실패");
    }

    info!(
        run_id = %run_id,
        updated = updated.len(),
        failed = failed.len(),
        skipped = skipped.len(),
        elapsed_secs = format!("{:.1}", started.elapsed().as_secs_f64()),
        "계산 잡 완료"
    );

    JobReport {
        run_id,
        updated,
        failed,
        skipped,
        started_at,
        finished_at,
    }
}
