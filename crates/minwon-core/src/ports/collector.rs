//! 수집기 클라이언트 포트.
//!
//! 구현: `minwon-network` crate (reqwest)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::event::TelemetryBatch;

/// 원격 수집기 전송 클라이언트
#[async_trait]
pub trait CollectorClient: Send + Sync {
    /// 배치 전송
    ///
    /// 2xx 응답만 성공으로 취급한다. 그 외 상태 코드와 전송 에러는
    /// 호출 측(디스패처)이 큐 복원으로 처리한다.
    async fn deliver(&self, batch: &TelemetryBatch) -> Result<(), CoreError>;

    /// 종료 시점 fire-and-forget 전송
    ///
    /// 응답을 읽지 않으며 완료를 보장하지 않는다. 실패해도 재시도하지
    /// 않는다 — 종료 직전 전송의 의도된 트레이드오프.
    fn deliver_detached(&self, batch: TelemetryBatch);
}
