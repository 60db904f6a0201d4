//! 외부 싱크 포트.
//!
//! 제품 분석/크래시 리포트용 외부 소비자. 선택적 기능이며,
//! 부재가 기본·정상 상태이므로 no-op 기본 구현을 제공한다.
//! 전역 심볼 존재 검사 대신 주입된 capability로 모델링한다.

use crate::models::event::{ErrorRecord, TelemetryEvent};
use crate::models::report::HealthReport;

/// 제품 분석 싱크 — 이벤트 best-effort 전달
pub trait AnalyticsSink: Send + Sync {
    /// 이벤트 1건 전달. 블로킹하거나 실패를 전파해서는 안 된다.
    fn report_event(&self, event: &TelemetryEvent);
}

/// 에러 추적 싱크 — 크래시 리포트 및 헬스 리포트 전달
pub trait ErrorSink: Send + Sync {
    /// 에러 리포트 전달
    fn capture_error(&self, record: &ErrorRecord);

    /// 경고/위험 등급 헬스 리포트 전달
    fn capture_report(&self, report: &HealthReport);
}

/// 아무것도 하지 않는 기본 싱크
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl AnalyticsSink for NoopSink {
    fn report_event(&self, _event: &TelemetryEvent) {}
}

impl ErrorSink for NoopSink {
    fn capture_error(&self, _record: &ErrorRecord) {}
    fn capture_report(&self, _report: &HealthReport) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn noop_sink_accepts_everything() {
        let sink = NoopSink;
        sink.report_event(&TelemetryEvent::new("navigation", "page_view"));
        sink.capture_error(&ErrorRecord {
            message: "무시됨".to_string(),
            context: "test".to_string(),
            metadata: serde_json::Value::Null,
            severity: Default::default(),
            timestamp: Utc::now(),
            user_agent: "test".to_string(),
            page: None,
            user_id: None,
        });
    }
}
