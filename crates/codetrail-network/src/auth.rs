//! 수집 서버 인증 토큰 관리.
//!
//! 사용자명/비밀번호를 form으로 보내 토큰을 받고, 메모리에 보관한다.
//! 저장된 토큰이 있으면 설정에서 바로 채운다.

use codetrail_core::config::{AppConfig, Credentials};
use codetrail_core::error::CoreError;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 토큰 획득 경로
const TOKEN_PATH: &str = "/api-token-auth/";

/// 서버 응답: 토큰 획득
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// 토큰 매니저: 획득/보관
#[derive(Clone)]
pub struct TokenManager {
    base_url: String,
    client: reqwest::Client,
    state: Arc<RwLock<Option<String>>>,
}

impl TokenManager {
    /// 새 토큰 매니저 생성
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            state: Arc::new(RwLock::new(None)),
        }
    }

    /// 설정의 서버 주소와 저장된 토큰으로 생성
    pub fn from_config(config: &AppConfig) -> Self {
        let manager = Self::new(&config.server.base_url);
        let token = config
            .credentials
            .has_token()
            .then(|| config.credentials.token.trim().to_string());
        Self {
            state: Arc::new(RwLock::new(token)),
            ..manager
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 사용자명/비밀번호 로그인 → 토큰 획득
    ///
    /// `POST <base>/api-token-auth/` (form: `username`, `password`).
    /// 2xx가 아니면 인증 실패다.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, CoreError> {
        if self.base_url.is_empty() {
            return Err(CoreError::ConfigMissing("서버 주소 없음".to_string()));
        }

        let url = format!("{}{}", self.base_url, TOKEN_PATH);
        let resp = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| CoreError::Auth(format!("로그인 요청 실패: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(CoreError::Auth(format!("로그인 실패 ({status}): {text}")));
        }

        let token_resp: TokenResponse = resp
            .json()
            .await
            .map_err(|e| CoreError::Auth(format!("토큰 파싱 실패: {e}")))?;

        let mut state = self.state.write().await;
        *state = Some(token_resp.token.clone());

        info!("로그인 성공: {username}");
        Ok(token_resp.token)
    }

    /// 보관 중인 토큰이 없으면 저장된 자격증명으로 로그인
    ///
    /// 자격증명도 없으면 `ConfigMissing`, 호출자가 로그인 흐름을 연다.
    pub async fn ensure_token(&self, credentials: &Credentials) -> Result<String, CoreError> {
        if let Some(token) = self.state.read().await.clone() {
            return Ok(token);
        }
        if !credentials.can_login() {
            return Err(CoreError::ConfigMissing(
                "토큰과 자격증명이 모두 없음".to_string(),
            ));
        }
        debug!("보관 토큰 없음, 자격증명으로 로그인");
        self.login(&credentials.username, &credentials.password)
            .await
    }

    /// 보관 중인 토큰 반환
    pub async fn get_token(&self) -> Result<String, CoreError> {
        self.state
            .read()
            .await
            .clone()
            .ok_or_else(|| CoreError::Auth("인증되지 않음".to_string()))
    }

    pub async fn set_token(&self, token: impl Into<String>) {
        let mut state = self.state.write().await;
        *state = Some(token.into());
    }

    /// 보관 토큰 폐기 (서버 호출 없음)
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = None;
        debug!("토큰 폐기");
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_some()
    }
}
