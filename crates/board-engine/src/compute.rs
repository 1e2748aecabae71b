//! 유니버스 단위 리더보드 계산.
//!
//! 종목별 수집을 동시 실행 한도 안에서 병렬로 수행하고, 전체 수집이
//! 끝난 뒤에만 랭킹을 집계합니다. 개별 수집 실패는 해당 종목 제외로
//! 처리되며 배치를 중단시키지 않습니다.

use chrono::Utc;
use futures::{stream, StreamExt};
use tracing::{info, warn};

use board_core::{MetricSample, Snapshot, Symbol};

use crate::error::{EngineError, Result};
use crate::fetcher::MetricFetcher;
use crate::ranker::{period_hint, rank_by_gross_margin, rank_by_net_margin, rank_by_quality};

/// 한 유니버스의 리더보드 스냅샷을 계산합니다.
///
/// 전체 업스트림 장애(모든 수집 실패)는 이 함수의 에러가 아닙니다.
/// `updated_at`이 설정된 빈 리더보드 스냅샷으로 강등됩니다. 보고 여부는
/// 호출자가 결정합니다.
pub async fn compute_leaderboard(
    universe: &str,
    symbols: &[Symbol],
    limit: usize,
    fetcher: &dyn MetricFetcher,
    parallelism: usize,
) -> Result<Snapshot> {
    if limit == 0 {
        return Err(EngineError::InvalidLimit(limit));
    }
    if symbols.is_empty() {
        return Err(EngineError::EmptySymbols(universe.to_string()));
    }
    if parallelism == 0 {
        return Err(EngineError::InvalidParallelism(parallelism));
    }

    let total = symbols.len();

    // 수집이 모두 끝난 뒤에만 집계 (join 후 랭킹)
    let results: Vec<Option<MetricSample>> = stream::iter(symbols.iter().cloned().map(|symbol| async move {
        match fetcher.fetch(&symbol).await {
            Ok(sample) => Some(sample),
            Err(e) => {
                warn!(universe = universe, symbol = %symbol, error = %e, "지표 수집 실패, 종목 제외");
                None
            }
        }
    }))
    .buffer_unordered(parallelism)
    .collect()
    .await;

    let samples: Vec<MetricSample> = results.into_iter().flatten().collect();

    let mut snapshot = if samples.is_empty() {
        warn!(universe = universe, total = total, "모든 수집 실패, 빈 스냅샷으로 강등");
        Snapshot::empty(universe)
    } else {
        Snapshot {
            universe: universe.to_string(),
            updated_at: None,
            period_hint: period_hint(&samples),
            top_net: rank_by_net_margin(&samples, limit),
            top_gross: rank_by_gross_margin(&samples, limit),
            top_quality: rank_by_quality(&samples, limit),
            note: None,
        }
    };
    snapshot.updated_at = Some(Utc::now());

    info!(
        universe = universe,
        total = total,
        succeeded = samples.len(),
        failed = total - samples.len(),
        period_hint = %snapshot.period_hint,
        "리더보드 계산 완료"
    );

    Ok(snapshot)
}
