//! codetrail 핵심 에러 타입.
//!
//! 어댑터 crate는 전송/설정 실패를 `CoreError`로 보고한다.
//! 구문 트리 해석 실패는 `codetrail-tracker`의 `ResolveError`가 담당한다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 직렬화, 설정, 인증, 전송 등 도메인 공통 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 설정 파일/항목 없음 또는 읽기 불가
    ///
    /// 호출자는 빈 값으로 취급하고 로그인 흐름으로 넘긴다.
    #[error("설정 없음: {0}")]
    ConfigMissing(String),

    /// 인증 실패 (토큰 없음, 자격증명 오류 등)
    #[error("인증 에러: {0}")]
    Auth(String),

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// Rate Limit 초과 (429)
    #[error("요청 한도 초과, {retry_after_secs}초 후 재시도")]
    RateLimit {
        /// 재시도 대기 시간 (초)
        retry_after_secs: u64,
    },

    /// 서비스 일시 불가 (503)
    #[error("서비스 일시 불가: {0}")]
    ServiceUnavailable(String),

    /// 내부 에러 (예상치 못한 상황, 기타 비성공 상태 코드)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 재로그인이 필요한 에러인지 확인
    ///
    /// 인증 실패는 저장된 자격증명으로 조용히 재시도하지 않는다.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::ConfigMissing(_))
    }
}
