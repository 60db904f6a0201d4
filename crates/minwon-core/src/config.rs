//! 텔레메트리 파이프라인 설정 구조체.
//!
//! 수집기 URL, flush 임계값/주기, 헬스 모니터 임계값, 실행 환경을 정의한다.
//! [`crate::config_manager::ConfigManager`]를 통해 JSON 파일에서 로드/저장.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 실행 환경 — 콘솔 로그 상세도와 주기 리포트 실행 여부를 결정하는
/// 유일한 환경 유래 스위치
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// 개발 환경 — 에러/경고를 콘솔에 그대로 출력, 주기 리포트 없음
    #[default]
    Development,
    /// 운영 환경 — 외부 싱크 전달 + 주기 헬스 리포트 활성화
    Production,
}

impl Environment {
    /// 운영 환경 여부
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// 최상위 텔레메트리 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// 수집기 연결 설정
    pub collector: CollectorConfig,
    /// 디스패처(버퍼/flush) 설정
    pub dispatch: DispatchConfig,
    /// 런타임 헬스 모니터 설정
    pub monitor: MonitorConfig,
    /// 실행 환경
    #[serde(default)]
    pub environment: Environment,
}

/// 수집기 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// 수집기 base URL (예: "https://minwon.example.go.kr")
    pub base_url: String,
    /// HTTP 요청 타임아웃 (초)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CollectorConfig {
    /// 요청 타임아웃
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 디스패처 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// 4개 큐 길이 합계가 이 값에 도달하면 즉시 flush
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,
    /// 큐 크기와 무관한 주기 flush 간격 (밀리초)
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
    /// 시작 시 수집 활성화 여부
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// ErrorRecord에 기록되는 클라이언트 식별 문자열
    #[serde(default = "default_client_info")]
    pub client_info: String,
}

impl DispatchConfig {
    /// 주기 flush 간격
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

/// 런타임 헬스 모니터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// 주기 헬스 리포트 간격 (밀리초, 운영 환경에서만 실행)
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
    /// 버스트 감지용 슬라이딩 윈도우 길이 (밀리초)
    #[serde(default = "default_rate_window_ms")]
    pub rate_window_ms: u64,
    /// 윈도우 내 API 호출 경고 임계값
    #[serde(default = "default_api_rate_threshold")]
    pub api_rate_threshold: usize,
    /// 윈도우 내 렌더 경고 임계값
    #[serde(default = "default_render_rate_threshold")]
    pub render_rate_threshold: usize,
    /// 에러/경고 히스토리 최대 보관 개수 (초과 시 가장 오래된 것부터 제거)
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    /// 누적 API 호출 수 critical 임계값
    #[serde(default = "default_api_total_critical")]
    pub api_total_critical: u64,
    /// 누적 렌더 수 critical 임계값
    #[serde(default = "default_render_total_critical")]
    pub render_total_critical: u64,
    /// 히스토리 길이 warning 임계값 (에러/경고 양쪽 모두 초과 시)
    #[serde(default = "default_history_pressure")]
    pub history_pressure_threshold: usize,
    /// 컨텍스트 재초기화 경고 임계값 (이 횟수를 넘는 초기화부터 경고)
    ///
    /// hot-reload 환경에서는 재초기화가 정상일 수 있으므로 상향 조정 가능.
    #[serde(default = "default_reinit_warn_threshold")]
    pub reinit_warn_threshold: u64,
}

impl MonitorConfig {
    /// 주기 리포트 간격
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    /// 슬라이딩 윈도우 길이
    pub fn rate_window(&self) -> Duration {
        Duration::from_millis(self.rate_window_ms)
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_flush_threshold() -> usize {
    10
}
fn default_flush_interval_ms() -> u64 {
    30_000
}
fn default_true() -> bool {
    true
}
fn default_client_info() -> String {
    format!("minwon-client/{}", env!("CARGO_PKG_VERSION"))
}
fn default_report_interval_ms() -> u64 {
    60_000
}
fn default_rate_window_ms() -> u64 {
    1_000
}
fn default_api_rate_threshold() -> usize {
    10
}
fn default_render_rate_threshold() -> usize {
    50
}
fn default_history_cap() -> usize {
    100
}
fn default_api_total_critical() -> u64 {
    1_000
}
fn default_render_total_critical() -> u64 {
    10_000
}
fn default_history_pressure() -> usize {
    50
}
fn default_reinit_warn_threshold() -> u64 {
    1
}

impl TelemetryConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            collector: CollectorConfig {
                base_url: "http://localhost:8000".to_string(),
                timeout_secs: default_timeout_secs(),
            },
            dispatch: DispatchConfig {
                flush_threshold: default_flush_threshold(),
                flush_interval_ms: default_flush_interval_ms(),
                enabled: true,
                client_info: default_client_info(),
            },
            monitor: MonitorConfig {
                report_interval_ms: default_report_interval_ms(),
                rate_window_ms: default_rate_window_ms(),
                api_rate_threshold: default_api_rate_threshold(),
                render_rate_threshold: default_render_rate_threshold(),
                history_cap: default_history_cap(),
                api_total_critical: default_api_total_critical(),
                render_total_critical: default_render_total_critical(),
                history_pressure_threshold: default_history_pressure(),
                reinit_warn_threshold: default_reinit_warn_threshold(),
            },
            environment: Environment::Development,
        }
    }
}
