//! 디스패처 상태 조회 모델.

use serde::{Deserialize, Serialize};

/// 큐 및 세션 상태 스냅샷 — 읽기 전용 introspection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStatus {
    /// 일반 이벤트 큐 길이
    pub events: usize,
    /// 에러 큐 길이
    pub errors: usize,
    /// 성능 샘플 큐 길이
    pub performance: usize,
    /// 사용자 행동 큐 길이
    pub user_actions: usize,
    /// 세션 ID
    pub session_id: String,
    /// 현재 사용자 ID
    pub user_id: Option<String>,
    /// 수집 활성화 여부
    pub enabled: bool,
    /// 온라인 여부
    pub online: bool,
}

impl QueueStatus {
    /// 4개 큐 길이 합계
    pub fn total(&self) -> usize {
        self.events + self.errors + self.performance + self.user_actions
    }
}
