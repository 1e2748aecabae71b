//! 수익성 지표 샘플.
//!
//! 한 종목에 대한 단일 수집 결과입니다. net margin과 gross margin은
//! 퍼센트(%) 값이며 quality score는 두 마진의 가중 결합으로 파생됩니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::symbol::Symbol;

/// quality score 계산.
///
/// `(3 * net + 2 * gross) / 5`, 소수점 4자리로 반올림.
/// 두 입력 모두에 대해 단조 증가하며 모든 종목에 동일하게 적용됩니다.
pub fn quality_score(net_margin: Decimal, gross_margin: Decimal) -> Decimal {
    ((net_margin * dec!(3) + gross_margin * dec!(2)) / dec!(5)).round_dp(4)
}

/// 한 종목의 수익성 지표 샘플.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    /// 종목 심볼
    pub symbol: Symbol,
    /// 순이익률 (%)
    pub net_margin: Decimal,
    /// 매출총이익률 (%)
    pub gross_margin: Decimal,
    /// 파생 품질 점수
    pub quality_score: Decimal,
    /// 보고 기간 라벨 (예: "2025-Q2")
    pub period: String,
}

impl MetricSample {
    /// 새 샘플을 생성합니다. quality score는 마진에서 자동 계산됩니다.
    pub fn new(
        symbol: Symbol,
        net_margin: Decimal,
        gross_margin: Decimal,
        period: impl Into<String>,
    ) -> Self {
        Self {
            symbol,
            net_margin,
            gross_margin,
            quality_score: quality_score(net_margin, gross_margin),
            period: period.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_score_weighting() {
        // (3*20 + 2*30) / 5 = 24
        assert_eq!(quality_score(dec!(20), dec!(30)), dec!(24));
    }

    #[test]
    fn test_quality_score_monotonic_in_both_inputs() {
        let base = quality_score(dec!(10), dec!(40));
        assert!(quality_score(dec!(11), dec!(40)) > base);
        assert!(quality_score(dec!(10), dec!(41)) > base);
    }

    #[test]
    fn test_sample_computes_score() {
        let sample = MetricSample::new(Symbol::new("AAPL"), dec!(25.5), dec!(44.1), "2025-Q2");
        assert_eq!(sample.quality_score, quality_score(dec!(25.5), dec!(44.1)));
        assert_eq!(sample.period, "2025-Q2");
    }
}
