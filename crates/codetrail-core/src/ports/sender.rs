//! 활동 전송 포트.
//!
//! 구현: `codetrail-network` crate (reqwest)

use async_trait::async_trait;

use crate::models::activity::ActivityBatch;

/// 활동 배치 전송기
///
/// 코어는 네트워크 I/O를 하지 않는다. 배치는 값으로 넘겨지므로
/// 전송기는 이후 세션 변경을 관찰할 수 없다.
#[async_trait]
pub trait ActivitySender: Send + Sync {
    /// 배치 전송: 수집기가 성공(2xx)을 확인한 경우에만 `true`
    ///
    /// 타임아웃/재시도 정책은 구현체 책임이다.
    async fn send_activities(&self, batch: ActivityBatch) -> bool;
}
