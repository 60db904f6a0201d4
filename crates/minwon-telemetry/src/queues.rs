//! 카테고리별 대기 큐.
//!
//! 4개 큐(이벤트/에러/성능/사용자 행동)는 뮤텍스 한 개 아래에 함께 놓인다.
//! flush의 스냅샷-후-클리어와 실패 시 선두 복원이 원자적으로 보여야
//! 하기 때문이다. 큐 내 순서 계약: 추적 순서대로 꼬리에 추가,
//! 실패 복원은 머리에 prepend (실패 시도 중 쌓인 새 항목이 복원분 뒤에 온다).

use chrono::Utc;
use minwon_core::models::event::{
    ErrorRecord, PerformanceSample, TelemetryBatch, TelemetryEvent, UserActionRecord,
};
use std::collections::VecDeque;

/// 4개 카테고리 대기 큐 묶음
#[derive(Debug, Default)]
pub(crate) struct QueueSet {
    events: VecDeque<TelemetryEvent>,
    errors: VecDeque<ErrorRecord>,
    performance: VecDeque<PerformanceSample>,
    user_actions: VecDeque<UserActionRecord>,
}

impl QueueSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 4개 큐 길이 합계
    pub(crate) fn total_len(&self) -> usize {
        self.events.len() + self.errors.len() + self.performance.len() + self.user_actions.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// 카테고리별 길이 (이벤트, 에러, 성능, 사용자 행동)
    pub(crate) fn lens(&self) -> (usize, usize, usize, usize) {
        (
            self.events.len(),
            self.errors.len(),
            self.performance.len(),
            self.user_actions.len(),
        )
    }

    /// 이벤트 추가, 새 합계 반환
    pub(crate) fn push_event(&mut self, event: TelemetryEvent) -> usize {
        self.events.push_back(event);
        self.total_len()
    }

    pub(crate) fn push_error(&mut self, record: ErrorRecord) -> usize {
        self.errors.push_back(record);
        self.total_len()
    }

    pub(crate) fn push_performance(&mut self, sample: PerformanceSample) -> usize {
        self.performance.push_back(sample);
        self.total_len()
    }

    pub(crate) fn push_user_action(&mut self, record: UserActionRecord) -> usize {
        self.user_actions.push_back(record);
        self.total_len()
    }

    /// 스냅샷-후-클리어: 모든 큐를 비우고 배치로 반환
    ///
    /// 호출자는 이 메서드를 뮤텍스를 잡은 채 동기적으로 실행해야 한다.
    /// 이후 await 중에 추적된 항목은 새 큐에 쌓이며 이 배치에 속하지 않는다.
    pub(crate) fn drain_batch(&mut self, session_id: &str) -> TelemetryBatch {
        TelemetryBatch {
            session_id: session_id.to_string(),
            events: self.events.drain(..).collect(),
            errors: self.errors.drain(..).collect(),
            performance: self.performance.drain(..).collect(),
            user_events: self.user_actions.drain(..).collect(),
            timestamp: Utc::now(),
        }
    }

    /// 전송 실패한 배치를 각 큐의 머리에 복원
    ///
    /// 복원분 내부의 상대 순서를 유지한 채, 실패 시도 중에 추가된
    /// 항목들 앞에 놓는다.
    pub(crate) fn restore_front(&mut self, batch: TelemetryBatch) {
        for event in batch.events.into_iter().rev() {
            self.events.push_front(event);
        }
        for record in batch.errors.into_iter().rev() {
            self.errors.push_front(record);
        }
        for sample in batch.performance.into_iter().rev() {
            self.performance.push_front(sample);
        }
        for record in batch.user_events.into_iter().rev() {
            self.user_actions.push_front(record);
        }
    }
}
