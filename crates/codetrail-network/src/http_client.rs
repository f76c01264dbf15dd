//! 활동 배치 HTTP 전송.
//!
//! `ActivitySender` 포트 구현. `Authorization: Token` 헤더 주입 + 재시도 로직.
//! 실패는 로그로 남기고 `false`를 반환한다. 미전송 활동 보관은 추적기 책임이다.

use async_trait::async_trait;
use codetrail_core::config::AppConfig;
use codetrail_core::error::CoreError;
use codetrail_core::models::activity::ActivityBatch;
use codetrail_core::ports::sender::ActivitySender;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::auth::TokenManager;

/// 기본 재시도 횟수
const DEFAULT_MAX_RETRIES: u32 = 3;

/// 활동 전송 경로
const ACTIVITIES_PATH: &str = "/activities/";

/// Retry-After 기본값이자 상한 (초)
///
/// 전송 중에는 추적기 세션 잠금이 유지되므로 서버 지정 대기 시간을 제한한다.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// 재시도 가능한 에러인지 판별
///
/// 인증 실패는 같은 토큰으로 재시도하지 않는다.
fn is_retryable(error: &CoreError) -> bool {
    matches!(
        error,
        CoreError::Network(_) | CoreError::ServiceUnavailable(_) | CoreError::RateLimit { .. }
    )
}

/// 활동 전송 클라이언트
pub struct HttpActivitySender {
    client: reqwest::Client,
    base_url: String,
    token_manager: Arc<TokenManager>,
    max_retries: u32,
}

impl HttpActivitySender {
    /// 새 전송 클라이언트 생성
    pub fn new(
        base_url: &str,
        token_manager: Arc<TokenManager>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            token_manager,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// 설정의 서버 주소/타임아웃/재시도 횟수로 생성
    pub fn from_config(
        config: &AppConfig,
        token_manager: Arc<TokenManager>,
    ) -> Result<Self, CoreError> {
        Ok(
            Self::new(&config.server.base_url, token_manager, config.request_timeout())?
                .with_max_retries(config.server.max_retries),
        )
    }

    /// 재시도 횟수 설정
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// 배치 전송, 실패 원인을 그대로 반환
    pub async fn post_activities(&self, batch: &ActivityBatch) -> Result<(), CoreError> {
        if self.base_url.is_empty() {
            return Err(CoreError::ConfigMissing("서버 주소 없음".to_string()));
        }
        let token = self.token_manager.get_token().await?;
        let url = format!("{}{}", self.base_url, ACTIVITIES_PATH);

        self.execute_with_retry(|| async {
            let resp = self
                .client
                .post(&url)
                .header(reqwest::header::AUTHORIZATION, format!("Token {token}"))
                .json(batch)
                .send()
                .await
                .map_err(|e| CoreError::Network(format!("활동 전송 요청 실패: {e}")))?;

            self.check_response(resp).await?;
            Ok(())
        })
        .await
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    async fn check_response(
        &self,
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, CoreError> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs.min(DEFAULT_RETRY_AFTER_SECS));
        let text = resp.text().await.unwrap_or_else(|e| {
            warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });

        match status.as_u16() {
            401 => Err(CoreError::Auth(format!("인증 실패: {text}"))),
            429 => Err(CoreError::RateLimit {
                retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            }),
            503 => Err(CoreError::ServiceUnavailable(text)),
            _ => Err(CoreError::Internal(format!("API 에러 ({status}): {text}"))),
        }
    }

    /// 재시도가 포함된 요청 실행
    ///
    /// exponential backoff: 1s → 2s → 4s (최대 30s)
    async fn execute_with_retry<F, Fut, T>(&self, operation: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut last_error = CoreError::Internal("요청 실패".to_string());
        let mut delay = Duration::from_secs(1);

        for attempt in 0..=self.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !is_retryable(&e) || attempt == self.max_retries {
                        return Err(e);
                    }

                    warn!(
                        "요청 실패 (시도 {}/{}): {e}, {delay:?} 후 재시도",
                        attempt + 1,
                        self.max_retries + 1
                    );

                    // RateLimit의 경우 서버 지정 대기 시간 사용
                    if let CoreError::RateLimit { retry_after_secs } = &e {
                        delay = Duration::from_secs(*retry_after_secs);
                    }

                    last_error = e;
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(Duration::from_secs(30));
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl ActivitySender for HttpActivitySender {
    async fn send_activities(&self, batch: ActivityBatch) -> bool {
        debug!("활동 전송: {}개", batch.len());

        match self.post_activities(&batch).await {
            Ok(()) => true,
            Err(e) if e.requires_login() => {
                error!("활동 전송 실패, 재로그인 필요: {e}");
                false
            }
            Err(e) => {
                warn!("활동 전송 실패: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codetrail_core::models::activity::{Activity, Measurement};

    async fn authed_sender(server: &mockito::ServerGuard) -> HttpActivitySender {
        let tm = Arc::new(TokenManager::new(&server.url()));
        tm.set_token("test_token").await;
        HttpActivitySender::new(&server.url(), tm, Duration::from_secs(5)).unwrap()
    }

    fn sample_batch() -> ActivityBatch {
        let mut activity = Activity::new("codetrail");
        activity.push(Measurement::string("code path", "PROJ:P|LANG:C#|CLASS:A|LINE:1"));
        activity.push(Measurement::timestamp("code begin time", 1_700_000_000));
        ActivityBatch::new(vec![activity])
    }

    #[tokio::test]
    async fn send_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/activities/")
            .match_header("authorization", "Token test_token")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "activities": [{
                    "name": "codetrail",
                    "measurements": [
                        {"name": "code path", "type": "string", "value": "PROJ:P|LANG:C#|CLASS:A|LINE:1"},
                        {"name": "code begin time", "type": "long", "value": "1700000000"}
                    ]
                }]
            })))
            .with_status(201)
            .create_async()
            .await;

        let sender = authed_sender(&server).await;
        assert!(sender.send_activities(sample_batch()).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/activities/")
            .with_status(401)
            .with_body("Unauthorized")
            .expect(1)
            .create_async()
            .await;

        let sender = authed_sender(&server).await;
        let err = sender.post_activities(&sample_batch()).await.unwrap_err();
        assert!(matches!(err, CoreError::Auth(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rate_limit_429_uses_retry_after() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/activities/")
            .with_status(429)
            .with_header("retry-after", "7")
            .create_async()
            .await;

        let sender = authed_sender(&server).await.with_max_retries(0);
        let err = sender.post_activities(&sample_batch()).await.unwrap_err();
        assert!(matches!(err, CoreError::RateLimit { retry_after_secs: 7 }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn oversized_retry_after_is_clamped() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/activities/")
            .with_status(429)
            .with_header("retry-after", "86400")
            .create_async()
            .await;

        let sender = authed_sender(&server).await.with_max_retries(0);
        let err = sender.post_activities(&sample_batch()).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::RateLimit {
                retry_after_secs: DEFAULT_RETRY_AFTER_SECS
            }
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn service_unavailable_503_is_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/activities/")
            .with_status(503)
            .with_body("Service Unavailable")
            .expect(2)
            .create_async()
            .await;

        let sender = authed_sender(&server).await.with_max_retries(1);
        assert!(!sender.send_activities(sample_batch()).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_returns_false() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/activities/")
            .with_status(500)
            .with_body("Internal Server Error")
            .expect(2)
            .create_async()
            .await;

        let sender = authed_sender(&server).await;
        let err = sender.post_activities(&sample_batch()).await.unwrap_err();
        assert!(matches!(err, CoreError::Internal(_)));
        assert!(!sender.send_activities(sample_batch()).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_token_fails_without_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/activities/")
            .expect(0)
            .create_async()
            .await;

        let tm = Arc::new(TokenManager::new(&server.url()));
        let sender = HttpActivitySender::new(&server.url(), tm, Duration::from_secs(5)).unwrap();
        assert!(!sender.send_activities(sample_batch()).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn from_config_applies_retries() {
        let mut config = AppConfig::default_config();
        config.server.base_url = "http://localhost:8000/".to_string();
        config.server.max_retries = 5;

        let tm = Arc::new(TokenManager::from_config(&config));
        let sender = HttpActivitySender::from_config(&config, tm).unwrap();
        assert_eq!(sender.base_url, "http://localhost:8000");
        assert_eq!(sender.max_retries, 5);
    }

    #[test]
    fn retryable_errors() {
        assert!(is_retryable(&CoreError::Network("x".to_string())));
        assert!(is_retryable(&CoreError::RateLimit { retry_after_secs: 1 }));
        assert!(!is_retryable(&CoreError::Auth("x".to_string())));
        assert!(!is_retryable(&CoreError::Internal("x".to_string())));
    }
}
