//! 애플리케이션 설정 구조체.
//!
//! 수집기 URL, 자격증명(사용자명/비밀번호/토큰), 추적기 표시 정보를 정의한다.
//! 파일 로드/저장은 [`crate::config_manager`]가 담당한다.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 수집기 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 저장된 자격증명
    #[serde(default)]
    pub credentials: Credentials,
    /// 추적기 설정
    #[serde(default)]
    pub tracker: TrackerConfig,
}

/// 수집기 서버 연결 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 수집기 기본 URL (예: "https://metrics.example.com")
    ///
    /// 비어 있으면 미설정으로 취급한다.
    #[serde(default)]
    pub base_url: String,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// 일시적 전송 실패 재시도 횟수
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

/// 자격증명: 로그인 흐름이 채우고 코어는 읽기만 한다
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub token: String,
}

impl Credentials {
    /// 토큰 보유 여부
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// 로그인에 필요한 값이 모두 있는지 확인
    pub fn can_login(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

// 비밀번호/토큰이 로그에 남지 않도록 수동 구현
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("token", &if self.has_token() { "***" } else { "" })
            .finish()
    }
}

/// 추적기 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// 모든 활동에 붙는 생산 도구 이름
    #[serde(default = "default_activity_name")]
    pub activity_name: String,
    /// 언어 정보가 없을 때 사용할 언어 태그
    #[serde(default = "default_language")]
    pub default_language: String,
    /// 활동에 기록할 호스트 도구 이름 (없으면 생략)
    #[serde(default)]
    pub tool_name: Option<String>,
    /// 활동에 기록할 호스트 도구 버전 (없으면 생략)
    #[serde(default)]
    pub tool_version: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            activity_name: default_activity_name(),
            default_language: default_language(),
            tool_name: None,
            tool_version: None,
        }
    }
}

impl AppConfig {
    /// 기본 설정 (URL/자격증명 비어 있음)
    pub fn default_config() -> Self {
        Self::default()
    }

    /// 요청 타임아웃을 Duration으로 반환
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms)
    }

    /// 전송에 필요한 URL과 토큰이 모두 있는지 확인
    pub fn is_configured(&self) -> bool {
        !self.server.base_url.trim().is_empty() && self.credentials.has_token()
    }

    /// 저장 전 정규화: URL/사용자명 앞뒤 공백 제거
    pub fn normalized(mut self) -> Self {
        self.server.base_url = self.server.base_url.trim().to_string();
        self.credentials.username = self.credentials.username.trim().to_string();
        self
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_activity_name() -> String {
    "codetrail".to_string()
}

fn default_language() -> String {
    "C#".to_string()
}
