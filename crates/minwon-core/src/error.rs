//! MINWON 텔레메트리 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 자체 실패를 `CoreError`로 매핑한다.
//! 계측 진입점(track 계열)은 에러를 호출자에게 전파하지 않으므로,
//! 이 타입은 flush/전송 경로와 설정 로드 경로에서만 표면화된다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 수집기가 2xx 이외의 상태 코드로 응답
    #[error("수집기 거부 ({status}): {body}")]
    CollectorRejected {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문 (비어 있을 수 있음)
        body: String,
    },

    /// Rate Limit 초과 (429)
    #[error("요청 한도 초과, {retry_after_secs}초 후 재시도")]
    RateLimit {
        /// 재시도 대기 시간 (초)
        retry_after_secs: u64,
    },

    /// 서비스 일시 불가 (503)
    #[error("서비스 일시 불가: {0}")]
    ServiceUnavailable(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 일시적 실패 여부 — 큐 복원 후 다음 주기에 재시도 가능한 에러
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_)
                | CoreError::ServiceUnavailable(_)
                | CoreError::RateLimit { .. }
                | CoreError::CollectorRejected { .. }
        )
    }
}
