//! 코드 경로 해석 에러.

use thiserror::Error;

/// 해석 실패: 호출자는 "위치 변화 없음"으로 취급한다
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// 문법 로드 실패
    #[error("문법 로드 실패: {0}")]
    Language(String),

    /// 구문 트리 생성 실패 또는 파싱 중단
    #[error("구문 트리 생성 실패: {0}")]
    Parse(String),

    /// 커서 오프셋이 소스 범위를 벗어남
    #[error("오프셋 범위 초과: {offset} (문자 수 {len})")]
    OffsetOutOfRange {
        /// 요청된 문자 오프셋
        offset: usize,
        /// 소스 전체 문자 수
        len: usize,
    },
}
