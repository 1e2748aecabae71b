//! 재무 데이터 제공자 클라이언트.
//!
//! 손익계산서(income statement) 엔드포인트에서 한 종목의 최신 분기
//! 데이터를 조회하여 마진 지표를 파생합니다.
//!
//! ## 오류 매핑
//! - HTTP 429 → `DataError::RateLimited`
//! - 빈 응답 배열 → `DataError::NotFound` (알 수 없는 종목)
//! - 매출 0 이하 → `DataError::InvalidData` (마진 정의 불가)
//!
//! 이 계층은 재시도하지 않습니다. 재시도 정책은 호출자의 몫입니다.

use reqwest::{Client, StatusCode};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use board_core::Symbol;

use crate::error::{DataError, Result};

/// f64를 Decimal로 변환 후 소수점 2자리로 반올림.
///
/// 퍼센트(%) 값에 사용합니다.
fn round_decimal_from_f64_dp2(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.round_dp(2))
}

/// 제공자 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct StatementConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// API 키
    pub api_key: SecretString,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

/// 한 종목의 마진 수집 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginReport {
    /// 순이익률 (%)
    pub net_margin: Decimal,
    /// 매출총이익률 (%)
    pub gross_margin: Decimal,
    /// 보고 기간 라벨 (예: "2025-Q2")
    pub period: String,
}

/// 손익계산서 응답 항목.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatement {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    calendar_year: Option<String>,
    revenue: f64,
    gross_profit: f64,
    net_income: f64,
}

impl IncomeStatement {
    /// 보고 기간 라벨 구성.
    ///
    /// `calendarYear`와 `period`가 모두 있으면 "2025-Q2" 형식,
    /// 아니면 보고일자, 둘 다 없으면 "UNKNOWN".
    fn period_label(&self) -> String {
        match (&self.calendar_year, &self.period) {
            (Some(year), Some(period)) => format!("{}-{}", year, period),
            _ => self
                .date
                .clone()
                .unwrap_or_else(|| board_core::UNKNOWN_PERIOD.to_string()),
        }
    }
}

/// 재무 데이터 제공자 클라이언트.
pub struct StatementClient {
    http: Client,
    config: StatementConfig,
}

impl StatementClient {
    /// 새 클라이언트를 생성합니다.
    pub fn new(config: StatementConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP client build failed: {}", e)))?;

        Ok(Self { http, config })
    }

    /// 한 종목의 최신 분기 마진을 조회합니다.
    pub async fn fetch_margins(&self, symbol: &Symbol) -> Result<MarginReport> {
        let ticker = symbol.ticker();
        let url = format!("{}/income-statement/{}", self.config.base_url, ticker);

        debug!(symbol = %symbol, "income statement 조회 시작");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("period", "quarter"),
                ("limit", "1"),
                ("apikey", self.config.api_key.expose_secret()),
            ])
            .send()
            .await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(DataError::RateLimited),
            StatusCode::NOT_FOUND => {
                return Err(DataError::NotFound(format!("symbol: {}", ticker)))
            }
            status if !status.is_success() => {
                return Err(DataError::FetchError(format!(
                    "provider returned {} for {}",
                    status, ticker
                )));
            }
            _ => {}
        }

        let body = response.text().await?;
        let statements: Vec<IncomeStatement> = serde_json::from_str(&body)
            .map_err(|e| DataError::ParseError(format!("income statement ({}): {}", ticker, e)))?;

        let statement = statements
            .into_iter()
            .next()
            .ok_or_else(|| DataError::NotFound(format!("no statements for {}", ticker)))?;

        derive_margins(ticker, &statement)
    }
}

/// 손익계산서에서 마진 지표 파생.
fn derive_margins(ticker: &str, statement: &IncomeStatement) -> Result<MarginReport> {
    if statement.revenue <= 0.0 {
        return Err(DataError::InvalidData(format!(
            "non-positive revenue for {}",
            ticker
        )));
    }

    let net_margin = round_decimal_from_f64_dp2(statement.net_income / statement.revenue * 100.0)
        .ok_or_else(|| DataError::InvalidData(format!("net margin overflow for {}", ticker)))?;
    let gross_margin = round_decimal_from_f64_dp2(statement.gross_profit / statement.revenue * 100.0)
        .ok_or_else(|| DataError::InvalidData(format!("gross margin overflow for {}", ticker)))?;

    Ok(MarginReport {
        net_margin,
        gross_margin,
        period: statement.period_label(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_config(base_url: String) -> StatementConfig {
        StatementConfig {
            base_url,
            api_key: SecretString::from("test-key".to_string()),
            timeout_secs: 5,
        }
    }

    fn statement_body() -> &'static str {
        r#"[{
            "date": "2025-06-28",
            "symbol": "AAPL",
            "period": "Q2",
            "calendarYear": "2025",
            "revenue": 1000000.0,
            "grossProfit": 450000.0,
            "netIncome": 250000.0
        }]"#
    }

    #[tokio::test]
    async fn test_fetch_margins_derives_percentages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/income-statement/AAPL")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(statement_body())
            .create_async()
            .await;

        let client = StatementClient::new(test_config(server.url())).unwrap();
        let report = client
            .fetch_margins(&Symbol::new("NASDAQ:AAPL"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(report.net_margin, dec!(25.00));
        assert_eq!(report.gross_margin, dec!(45.00));
        assert_eq!(report.period, "2025-Q2");
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_distinct_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/income-statement/AAPL")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let client = StatementClient::new(test_config(server.url())).unwrap();
        let err = client
            .fetch_margins(&Symbol::new("AAPL"))
            .await
            .unwrap_err();

        assert!(matches!(err, DataError::RateLimited));
    }

    #[tokio::test]
    async fn test_empty_statements_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/income-statement/ZZZZ")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = StatementClient::new(test_config(server.url())).unwrap();
        let err = client
            .fetch_margins(&Symbol::new("ZZZZ"))
            .await
            .unwrap_err();

        assert!(matches!(err, DataError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/income-statement/AAPL")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = StatementClient::new(test_config(server.url())).unwrap();
        let err = client
            .fetch_margins(&Symbol::new("AAPL"))
            .await
            .unwrap_err();

        assert!(matches!(err, DataError::ParseError(_)));
    }

    #[test]
    fn test_zero_revenue_is_invalid_data() {
        let statement = IncomeStatement {
            date: Some("2025-06-28".to_string()),
            period: Some("Q2".to_string()),
            calendar_year: Some("2025".to_string()),
            revenue: 0.0,
            gross_profit: 100.0,
            net_income: 50.0,
        };

        let err = derive_margins("AAPL", &statement).unwrap_err();
        assert!(matches!(err, DataError::InvalidData(_)));
    }

    #[test]
    fn test_period_label_fallback_to_date() {
        let statement = IncomeStatement {
            date: Some("2025-06-28".to_string()),
            period: None,
            calendar_year: None,
            revenue: 1.0,
            gross_profit: 1.0,
            net_income: 1.0,
        };

        assert_eq!(statement.period_label(), "2025-06-28");
    }
}
