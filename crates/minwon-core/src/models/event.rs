//! 텔레메트리 이벤트 모델.
//!
//! 일반 이벤트, 에러 리포트, 성능 샘플, 사용자 행동 기록과
//! 수집기 전송용 배치 페이로드를 정의.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 일반 애플리케이션 이벤트
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// 이벤트 분류 (예: "navigation", "complaint", "auth")
    pub category: String,
    /// 수행된 동작 (예: "submit", "page_view")
    pub action: String,
    /// 선택적 레이블 (예: 페이지 경로, 민원 유형)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// 선택적 수치값 (예: 검색 결과 수)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// 자유 형식 메타데이터 (열린 확장 필드)
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
    /// 발생 시각 (epoch 밀리초로 직렬화)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// 이벤트 발생 시점의 사용자 ID (익명이면 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl TelemetryEvent {
    /// 분류/동작만 지정한 이벤트 생성 — 타임스탬프는 현재 시각,
    /// user_id는 디스패처가 큐잉 시점에 채운다
    pub fn new(category: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            action: action.into(),
            label: None,
            value: None,
            metadata: serde_json::Value::Null,
            timestamp: Utc::now(),
            user_id: None,
        }
    }

    /// 레이블 설정
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// 수치값 설정
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// 메타데이터 설정
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// 에러 심각도
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 낮음 — 복구된 예외, 무시 가능한 경고
    Low,
    /// 중간 — 기본값
    #[default]
    Medium,
    /// 높음 — 기능 손상을 동반하는 에러
    High,
}

/// 캡처된 에러/예외 리포트
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// 에러 메시지 (메시지/스택 직렬화 결과)
    pub message: String,
    /// 실행 컨텍스트 레이블 (예: "complaint_form", "report_export")
    pub context: String,
    /// 선택적 메타데이터
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
    /// 심각도
    #[serde(default)]
    pub severity: Severity,
    /// 발생 시각 (epoch 밀리초)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// 클라이언트 식별 문자열 (이름/버전)
    pub user_agent: String,
    /// 에러 발생 시점의 화면/페이지 경로
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    /// 사용자 ID (익명이면 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// 명명된 타이밍 측정값
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSample {
    /// 측정 이름 (예: "complaint_list_load")
    pub name: String,
    /// 소요 시간 (밀리초)
    pub duration_ms: f64,
    /// 측정 시작 시각 (epoch 밀리초)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,
    /// 측정 종료 시각 (epoch 밀리초)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ended_at: DateTime<Utc>,
    /// 기록 시각 (epoch 밀리초)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// 선택적 메타데이터
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

/// 사용자 귀속 행동 기록
///
/// 불변식: user_id 없이 생성되지 않는다. 익명 사용자의 행동은
/// 디스패처가 큐잉 이전에 조용히 폐기한다 (프라이버시 계약).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserActionRecord {
    /// 사용자 ID (필수)
    pub user_id: String,
    /// 수행한 행동 (예: "complaint_submitted")
    pub action: String,
    /// 대상 엔티티 종류 (예: "complaint")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    /// 대상 엔티티 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// 선택적 메타데이터
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
    /// 발생 시각 (epoch 밀리초)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// 수집기 전송용 배치 페이로드
///
/// 와이어 계약: `POST /api/analytics`의 camelCase JSON 본문.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryBatch {
    /// 세션 ID (페이지 로드/프로세스 수명당 1회 생성)
    pub session_id: String,
    /// 일반 이벤트
    pub events: Vec<TelemetryEvent>,
    /// 에러 리포트
    pub errors: Vec<ErrorRecord>,
    /// 성능 샘플
    pub performance: Vec<PerformanceSample>,
    /// 사용자 행동 기록
    pub user_events: Vec<UserActionRecord>,
    /// 배치 생성 시각 (epoch 밀리초)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl TelemetryBatch {
    /// 배치에 포함된 총 항목 수
    pub fn len(&self) -> usize {
        self.events.len() + self.errors.len() + self.performance.len() + self.user_events.len()
    }

    /// 빈 배치 여부
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_builder() {
        let event = TelemetryEvent::new("search", "query")
            .with_label("도로 파손")
            .with_value(17.0);
        assert_eq!(event.category, "search");
        assert_eq!(event.label.as_deref(), Some("도로 파손"));
        assert_eq!(event.value, Some(17.0));
        assert!(event.user_id.is_none());
    }

    #[test]
    fn batch_wire_format_is_camel_case_epoch_ms() {
        let batch = TelemetryBatch {
            session_id: "sess_1".to_string(),
            events: vec![TelemetryEvent::new("navigation", "page_view")],
            errors: vec![],
            performance: vec![],
            user_events: vec![],
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&batch).unwrap();
        assert!(json.get("sessionId").is_some());
        assert!(json.get("userEvents").is_some());
        // epoch 밀리초 — RFC3339 문자열이 아니라 숫자여야 한다
        assert!(json.get("timestamp").unwrap().is_i64());
        assert!(json["events"][0]["timestamp"].is_i64());
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn error_record_serde_roundtrip() {
        let record = ErrorRecord {
            message: "목록 조회 실패".to_string(),
            context: "complaint_list".to_string(),
            metadata: serde_json::json!({ "ward": "종로구" }),
            severity: Severity::High,
            timestamp: Utc::now(),
            user_agent: "minwon-client/0.4.2".to_string(),
            page: Some("/complaints".to_string()),
            user_id: None,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: ErrorRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.context, "complaint_list");
        assert_eq!(back.severity, Severity::High);
        assert_eq!(back.metadata["ward"], "종로구");
    }
}
