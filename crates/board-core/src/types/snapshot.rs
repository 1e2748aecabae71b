//! 리더보드 스냅샷.
//!
//! 한 유니버스에 대해 계산된 최신 리더보드입니다. 계산 엔진이 생성하여
//! 캐시 스토어에 기록하고, 읽기 엔드포인트가 그대로 제공합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sample::MetricSample;

/// 기간 정보가 없거나 일치하지 않을 때 사용하는 라벨.
pub const UNKNOWN_PERIOD: &str = "UNKNOWN";

/// 유니버스별 리더보드 스냅샷.
///
/// 세 리더보드는 각각 net margin, gross margin, quality score 내림차순으로
/// 정렬되며 설정된 limit를 초과하지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// 유니버스 이름
    pub universe: String,
    /// 계산 완료 시각
    pub updated_at: Option<DateTime<Utc>>,
    /// 기여 샘플의 최빈 보고 기간
    pub period_hint: String,
    /// net margin 내림차순 리더보드
    pub top_net: Vec<MetricSample>,
    /// gross margin 내림차순 리더보드
    pub top_gross: Vec<MetricSample>,
    /// quality score 내림차순 리더보드
    pub top_quality: Vec<MetricSample>,
    /// 안내 메시지 (데이터가 없을 때)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Snapshot {
    /// 비어 있는 스냅샷을 생성합니다.
    ///
    /// 계산 잡이 아직 실행되지 않았거나 모든 수집이 실패한 경우의
    /// 정상적인 응답 형태입니다.
    pub fn empty(universe: impl Into<String>) -> Self {
        Self {
            universe: universe.into(),
            updated_at: None,
            period_hint: UNKNOWN_PERIOD.to_string(),
            top_net: Vec::new(),
            top_gross: Vec::new(),
            top_quality: Vec::new(),
            note: Some(
                "No leaderboard has been computed for this universe yet.".to_string(),
            ),
        }
    }

    /// 세 리더보드가 모두 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.top_net.is_empty() && self.top_gross.is_empty() && self.top_quality.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_shape() {
        let snapshot = Snapshot::empty("NDX");
        assert_eq!(snapshot.universe, "NDX");
        assert_eq!(snapshot.period_hint, UNKNOWN_PERIOD);
        assert!(snapshot.is_empty());
        assert!(snapshot.updated_at.is_none());
        assert!(snapshot.note.is_some());
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snapshot = Snapshot::empty("NDX");
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"periodHint\""));
        assert!(json.contains("\"topNet\""));
        assert!(json.contains("\"updatedAt\""));
    }
}
