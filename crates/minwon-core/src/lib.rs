//! # minwon-core
//!
//! MINWON 민원 포털 클라이언트 텔레메트리의 도메인 모델, 포트(trait),
//! 에러 타입. 파이프라인의 모든 크레이트가 공유하는 핵심 타입과
//! 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 와이어/리포트 데이터 구조체 (serde Serialize/Deserialize)
//! - [`ports`] — Hexagonal Architecture 포트 인터페이스
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 텔레메트리 설정 구조체
//! - [`config_manager`] — 설정 파일 관리 (로드/저장)

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;

#[cfg(test)]
mod tests {
    use crate::models::event::{Severity, TelemetryEvent, UserActionRecord};

    #[test]
    fn user_action_serde_roundtrip() {
        let record = UserActionRecord {
            user_id: "user_042".to_string(),
            action: "complaint_submitted".to_string(),
            entity_type: Some("complaint".to_string()),
            entity_id: Some("c_1031".to_string()),
            metadata: serde_json::json!({ "ward": "마포구" }),
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: UserActionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.user_id, "user_042");
        assert_eq!(back.entity_id.as_deref(), Some("c_1031"));
    }

    #[test]
    fn default_severity_is_medium() {
        assert_eq!(Severity::default(), Severity::Medium);
    }

    #[test]
    fn null_metadata_is_not_serialized() {
        let event = TelemetryEvent::new("form", "field_blur");
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("metadata").is_none());
        assert!(json.get("label").is_none());
    }
}
