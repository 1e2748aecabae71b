//! 지표 수집기 인터페이스.
//!
//! 엔진은 이 trait을 통해서만 외부 제공자를 봅니다. 테스트에서는
//! 스크립트된 구현으로 대체합니다.

use async_trait::async_trait;

use board_core::{MetricSample, Symbol};
use board_data::{DataError, StatementClient};

/// 한 종목의 지표 샘플을 수집하는 인터페이스.
///
/// 실패는 호출자(엔진)에게 치명적이지 않습니다. 해당 종목이 샘플을
/// 내지 못했다는 의미일 뿐이며 배치 전체를 중단시키지 않습니다.
#[async_trait]
pub trait MetricFetcher: Send + Sync {
    /// 한 종목의 지표 샘플을 수집합니다.
    async fn fetch(&self, symbol: &Symbol) -> Result<MetricSample, DataError>;
}

/// 손익계산서 제공자 기반 수집기.
pub struct StatementFetcher {
    client: StatementClient,
}

impl StatementFetcher {
    /// 새 수집기를 생성합니다.
    pub fn new(client: StatementClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetricFetcher for StatementFetcher {
    async fn fetch(&self, symbol: &Symbol) -> Result<MetricSample, DataError> {
        let report = self.client.fetch_margins(symbol).await?;
        Ok(MetricSample::new(
            symbol.clone(),
            report.net_margin,
            report.gross_margin,
            report.period,
        ))
    }
}
