//! 헬스 리포트 모델.
//!
//! 런타임 헬스 모니터가 주기적으로 합성하는 집계 리포트와
//! 캡된 히스토리에 보관되는 로그 엔트리를 정의.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 리포트 심각도 — 외부 싱크 전달 여부를 결정하는 3단계 분류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSeverity {
    /// 정상 — 로컬 로그만 남기고 싱크에 전달하지 않는다
    #[default]
    Normal,
    /// 경고 — 에러/경고 히스토리가 압박 임계값을 초과
    Warning,
    /// 위험 — 누적 호출/렌더 카운터가 critical 임계값을 초과
    Critical,
}

/// 히스토리에 보관되는 에러/경고 엔트리
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// 메시지
    pub message: String,
    /// 발생 컨텍스트
    pub context: String,
    /// 기록 시각
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// 현재 시각으로 엔트리 생성
    pub fn now(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: context.into(),
            timestamp: Utc::now(),
        }
    }
}

/// 런타임 헬스 집계 리포트
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// 리포트 생성 시각
    pub generated_at: DateTime<Utc>,
    /// 모니터 가동 시간 (초)
    pub uptime_secs: u64,
    /// "METHOD 경로" 키별 누적 API 호출 수
    pub api_calls: HashMap<String, u64>,
    /// 컴포넌트별 누적 렌더 수
    pub renders: HashMap<String, u64>,
    /// 컨텍스트별 초기화 횟수
    pub context_inits: HashMap<String, u64>,
    /// 가동 시간 기반 분당 API 호출 추정치
    pub calls_per_minute: f64,
    /// 최근 에러 (최대 10개)
    pub recent_errors: Vec<LogEntry>,
    /// 최근 경고 (최대 10개)
    pub recent_warnings: Vec<LogEntry>,
    /// 누적 에러 수 (히스토리 캡과 무관한 수명 총계)
    pub total_errors: u64,
    /// 누적 경고 수
    pub total_warnings: u64,
    /// 분류된 심각도
    pub severity: ReportSeverity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(ReportSeverity::Critical > ReportSeverity::Warning);
        assert!(ReportSeverity::Warning > ReportSeverity::Normal);
    }

    #[test]
    fn report_serde_roundtrip() {
        let mut api_calls = HashMap::new();
        api_calls.insert("GET /api/complaints".to_string(), 42u64);

        let report = HealthReport {
            generated_at: Utc::now(),
            uptime_secs: 120,
            api_calls,
            renders: HashMap::new(),
            context_inits: HashMap::new(),
            calls_per_minute: 21.0,
            recent_errors: vec![LogEntry::now("목록 파싱 실패", "complaint_list")],
            recent_warnings: vec![],
            total_errors: 1,
            total_warnings: 0,
            severity: ReportSeverity::Normal,
        };

        let json = serde_json::to_string(&report).unwrap();
        let back: HealthReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.api_calls["GET /api/complaints"], 42);
        assert_eq!(back.severity, ReportSeverity::Normal);
    }
}
