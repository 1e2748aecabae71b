//! credential 로테이션 completion 클라이언트.
//!
//! 요청마다 풀을 섞어 순차 시도합니다. 인덱스 기반 round-robin 대신
//! 무작위 순서를 쓰는 이유는 동시 요청들이 같은 "첫 번째" credential로
//! 몰리는 것을 막기 위해서입니다. 시도는 엄격히 순차적이며 첫 성공에서
//! 즉시 반환하므로 업스트림 호출은 요청당 최대 |pool|회입니다.

use rand::seq::SliceRandom;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, TextGenError};
use crate::extract::extract_json;

/// completion 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// chat completions 엔드포인트 URL
    pub endpoint: String,
    /// 모델 식별자
    pub model: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 응답 최대 토큰 수
    pub max_tokens: u32,
    /// 샘플링 온도
    pub temperature: f64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// 단일 credential 시도의 실패 원인.
enum AttemptFailure {
    /// 쿼터 소진 (429)
    RateLimited,
    /// 그 외 실패 (네트워크, 비정상 상태 코드, 파싱 불가 응답)
    Other(String),
}

/// credential 로테이션 completion 클라이언트.
pub struct CompletionClient {
    http: Client,
    config: CompletionConfig,
    pool: Vec<SecretString>,
}

impl CompletionClient {
    /// 새 클라이언트를 생성합니다.
    ///
    /// 빈 풀로도 생성은 가능하며, `generate` 호출 시점에 설정 오류로
    /// 보고됩니다.
    pub fn new(config: CompletionConfig, pool: Vec<SecretString>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TextGenError::Config(format!("HTTP client build failed: {}", e)))?;

        Ok(Self { http, config, pool })
    }

    /// 풀에 등록된 credential 수.
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// 프롬프트에 대한 구조화된 JSON 페이로드를 생성합니다.
    ///
    /// 섞인 순서로 credential을 하나씩 시도하고 첫 번째 파싱 성공을
    /// 반환합니다. 모든 credential이 실패하면 [`TextGenError::Exhausted`],
    /// 풀이 비어 있으면 [`TextGenError::EmptyPool`]을 반환합니다.
    pub async fn generate(&self, prompt: &str) -> Result<Value> {
        if self.pool.is_empty() {
            return Err(TextGenError::EmptyPool);
        }

        let mut order: Vec<usize> = (0..self.pool.len()).collect();
        order.shuffle(&mut rand::thread_rng());

        let mut attempts = 0usize;
        let mut rate_limited = 0usize;

        for index in order {
            attempts += 1;
            match self.try_credential(&self.pool[index], prompt).await {
                Ok(payload) => {
                    debug!(attempts = attempts, "completion 성공");
                    return Ok(payload);
                }
                Err(AttemptFailure::RateLimited) => {
                    rate_limited += 1;
                    debug!(credential = index, "credential 쿼터 소진, 다음 credential 시도");
                }
                Err(AttemptFailure::Other(reason)) => {
                    debug!(credential = index, reason = %reason, "credential 시도 실패");
                }
            }
        }

        warn!(
            attempts = attempts,
            rate_limited = rate_limited,
            "모든 credential 소진"
        );

        Err(TextGenError::Exhausted {
            attempts,
            rate_limited,
        })
    }

    /// 단일 credential로 요청하고 응답에서 JSON을 추출합니다.
    async fn try_credential(
        &self,
        credential: &SecretString,
        prompt: &str,
    ) -> std::result::Result<Value, AttemptFailure> {
        let request = CompletionRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(&self.config.endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", credential.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| AttemptFailure::Other(e.to_string()))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(AttemptFailure::RateLimited),
            status if !status.is_success() => {
                return Err(AttemptFailure::Other(format!(
                    "upstream returned {}",
                    status
                )));
            }
            _ => {}
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AttemptFailure::Other(format!("response body: {}", e)))?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AttemptFailure::Other("empty choices".to_string()))?;

        // 페이로드가 산문이나 코드 펜스에 싸여 있을 수 있음
        let payload = extract_json(&text)
            .ok_or_else(|| AttemptFailure::Other("no JSON payload in completion".to_string()))?;

        serde_json::from_str(payload)
            .map_err(|e| AttemptFailure::Other(format!("payload parse: {}", e)))
    }
}
