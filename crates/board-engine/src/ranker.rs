//! 리더보드 랭킹.
//!
//! 생존한 샘플을 세 번 독립적으로 정렬하여 리더보드를 만듭니다.
//! 동점은 심볼 사전순 오름차순으로 깨서 결과를 결정적으로 만듭니다.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use board_core::{MetricSample, UNKNOWN_PERIOD};

/// 키 함수 기준 내림차순 상위 `limit`개를 반환합니다.
fn rank_top(
    samples: &[MetricSample],
    limit: usize,
    key: impl Fn(&MetricSample) -> Decimal,
) -> Vec<MetricSample> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| a.symbol.cmp(&b.symbol)));
    sorted.truncate(limit);
    sorted
}

/// net margin 내림차순 상위 `limit`개.
pub fn rank_by_net_margin(samples: &[MetricSample], limit: usize) -> Vec<MetricSample> {
    rank_top(samples, limit, |s| s.net_margin)
}

/// gross margin 내림차순 상위 `limit`개.
pub fn rank_by_gross_margin(samples: &[MetricSample], limit: usize) -> Vec<MetricSample> {
    rank_top(samples, limit, |s| s.gross_margin)
}

/// quality score 내림차순 상위 `limit`개.
pub fn rank_by_quality(samples: &[MetricSample], limit: usize) -> Vec<MetricSample> {
    rank_top(samples, limit, |s| s.quality_score)
}

/// 기여 샘플의 최빈 보고 기간.
///
/// 빈도 동점은 라벨 사전순으로 깨고, 샘플이 없으면 `UNKNOWN`을 반환합니다.
pub fn period_hint(samples: &[MetricSample]) -> String {
    // 빈도 동점에서는 사전순으로 먼저 오는 라벨이 선택됨
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for sample in samples {
        *counts.entry(sample.period.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by(|(label_a, count_a), (label_b, count_b)| {
            count_a.cmp(count_b).then_with(|| label_b.cmp(label_a))
        })
        .map(|(label, _)| label.to_string())
        .unwrap_or_else(|| UNKNOWN_PERIOD.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::Symbol;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn sample(symbol: &str, net: Decimal, gross: Decimal, period: &str) -> MetricSample {
        MetricSample::new(Symbol::new(symbol), net, gross, period)
    }

    #[test]
    fn test_rank_by_net_margin_descending() {
        let samples = vec![
            sample("B", dec!(10), dec!(50), "2025-Q2"),
            sample("A", dec!(20), dec!(30), "2025-Q2"),
        ];

        let ranked = rank_by_net_margin(&samples, 2);
        assert_eq!(ranked[0].symbol.as_str(), "A");
        assert_eq!(ranked[1].symbol.as_str(), "B");

        let ranked = rank_by_gross_margin(&samples, 2);
        assert_eq!(ranked[0].symbol.as_str(), "B");
        assert_eq!(ranked[1].symbol.as_str(), "A");
    }

    #[test]
    fn test_tie_broken_by_symbol_order() {
        let samples = vec![
            sample("MSFT", dec!(25), dec!(60), "2025-Q2"),
            sample("AAPL", dec!(25), dec!(60), "2025-Q2"),
        ];

        let ranked = rank_by_net_margin(&samples, 2);
        assert_eq!(ranked[0].symbol.as_str(), "AAPL");
        assert_eq!(ranked[1].symbol.as_str(), "MSFT");
    }

    #[test]
    fn test_truncates_to_limit() {
        let samples = vec![
            sample("A", dec!(1), dec!(1), "2025-Q2"),
            sample("B", dec!(2), dec!(2), "2025-Q2"),
            sample("C", dec!(3), dec!(3), "2025-Q2"),
        ];

        assert_eq!(rank_by_quality(&samples, 2).len(), 2);
    }

    #[test]
    fn test_period_hint_most_common() {
        let samples = vec![
            sample("A", dec!(1), dec!(1), "2025-Q2"),
            sample("B", dec!(1), dec!(1), "2025-Q2"),
            sample("C", dec!(1), dec!(1), "2025-Q1"),
        ];

        assert_eq!(period_hint(&samples), "2025-Q2");
    }

    #[test]
    fn test_period_hint_tie_is_deterministic() {
        let samples = vec![
            sample("A", dec!(1), dec!(1), "2025-Q2"),
            sample("B", dec!(1), dec!(1), "2025-Q1"),
        ];

        // 동점이면 사전순으로 빠른 라벨
        assert_eq!(period_hint(&samples), "2025-Q1");
    }

    #[test]
    fn test_period_hint_empty_is_unknown() {
        assert_eq!(period_hint(&[]), UNKNOWN_PERIOD);
    }

    proptest! {
        #[test]
        fn prop_rank_length_never_exceeds_limit(
            nets in proptest::collection::vec(0i64..10_000, 0..40),
            limit in 1usize..20,
        ) {
            let samples: Vec<MetricSample> = nets
                .iter()
                .enumerate()
                .map(|(i, n)| sample(&format!("S{:03}", i), Decimal::new(*n, 2), Decimal::new(*n, 2), "2025-Q2"))
                .collect();

            let ranked = rank_by_net_margin(&samples, limit);
            prop_assert!(ranked.len() <= limit);
            prop_assert!(ranked.len() <= samples.len());

            // 내림차순 + 결정적 동점 처리
            for pair in ranked.windows(2) {
                let ordering = pair[1].net_margin.cmp(&pair[0].net_margin);
                prop_assert!(ordering != std::cmp::Ordering::Greater);
                if ordering == std::cmp::Ordering::Equal {
                    prop_assert!(pair[0].symbol < pair[1].symbol);
                }
            }
        }

        #[test]
        fn prop_ranking_is_idempotent(
            nets in proptest::collection::vec(0i64..1_000, 0..20),
        ) {
            let samples: Vec<MetricSample> = nets
                .iter()
                .enumerate()
                .map(|(i, n)| sample(&format!("S{:03}", i), Decimal::new(*n, 1), Decimal::new(*n, 1), "2025-Q2"))
                .collect();

            let first = rank_by_net_margin(&samples, 10);
            let second = rank_by_net_margin(&first, 10);
            prop_assert_eq!(first, second);
        }
    }
}
