//! 잡 실행 통계 구조체.

use serde::Serialize;
use std::time::Duration;

use board_engine::JobReport;

/// 잡 실행 통계.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// 처리 대상 유니버스 수
    pub total: usize,
    /// 캐시가 갱신된 유니버스 수
    pub updated: usize,
    /// 실패한 유니버스 수
    pub failed: usize,
    /// 예산 초과로 건너뛴 유니버스 수
    pub skipped: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunStats {
    /// 잡 보고서에서 통계 생성.
    pub fn from_report(report: &JobReport) -> Self {
        let elapsed = (report.finished_at - report.started_at)
            .to_std()
            .unwrap_or_default();

        Self {
            total: report.total(),
            updated: report.updated.len(),
            failed: report.failed.len(),
            skipped: report.skipped.len(),
            elapsed,
        }
    }

    /// 성공률 계산 (%).
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.updated as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력.
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            updated = self.updated,
            failed = self.failed,
            skipped = self.skipped,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "잡 실행 완료"
        );
    }
}
