//! 런타임 헬스 모니터.
//!
//! 중복 초기화, API 호출 폭주, 렌더 폭주를 감지하고 주기적으로 집계
//! 리포트를 합성한다. 순수 관측용 — 계측 대상의 동작을 바꾸지 않고,
//! 경고는 호출 경로를 중단시키지 않는 advisory다.

use chrono::Utc;
use minwon_core::config::{Environment, MonitorConfig};
use minwon_core::models::event::{ErrorRecord, Severity};
use minwon_core::models::report::{HealthReport, LogEntry, ReportSeverity};
use minwon_core::ports::sink::{ErrorSink, NoopSink};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::rate_window::HealthCounter;

/// 뮤텍스 아래에 함께 놓이는 모니터 내부 상태
struct MonitorState {
    /// 모니터 시작(또는 마지막 reset) 시각
    started_at: Instant,
    /// 컨텍스트별 초기화 횟수
    context_inits: HashMap<String, u64>,
    /// "METHOD 경로" 키별 API 호출 카운터
    api_calls: HashMap<String, HealthCounter>,
    /// 컴포넌트별 렌더 카운터
    renders: HashMap<String, HealthCounter>,
    /// 캡된 에러 히스토리 (오래된 것부터 제거)
    errors: VecDeque<LogEntry>,
    /// 캡된 경고 히스토리
    warnings: VecDeque<LogEntry>,
    /// 수명 총계 (히스토리 캡과 무관)
    total_errors: u64,
    total_warnings: u64,
}

impl MonitorState {
    fn new(now: Instant) -> Self {
        Self {
            started_at: now,
            context_inits: HashMap::new(),
            api_calls: HashMap::new(),
            renders: HashMap::new(),
            errors: VecDeque::new(),
            warnings: VecDeque::new(),
            total_errors: 0,
            total_warnings: 0,
        }
    }
}

/// 런타임 헬스 모니터
///
/// 명시적으로 생성해 `Arc`로 공유한다. 주기 리포트 루프는
/// [`RuntimeMonitor::spawn_reporting`]으로 띄우고 핸들로 중단한다.
pub struct RuntimeMonitor {
    config: MonitorConfig,
    environment: Environment,
    error_sink: Arc<dyn ErrorSink>,
    state: Mutex<MonitorState>,
}

impl RuntimeMonitor {
    /// 새 모니터 생성
    pub fn new(config: MonitorConfig, environment: Environment) -> Self {
        Self {
            config,
            environment,
            error_sink: Arc::new(NoopSink),
            state: Mutex::new(MonitorState::new(Instant::now())),
        }
    }

    /// 에러 추적 싱크 설정
    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.error_sink = sink;
        self
    }

    // ========================================================
    // 관측 진입점
    // ========================================================

    /// 컨텍스트 초기화 기록
    ///
    /// 누적 횟수가 경고 임계값(기본 1)을 넘으면 중복 초기화 경고를 남긴다.
    /// hot-reload 환경에서는 임계값을 올려 정상 재초기화를 허용할 수 있다.
    pub fn track_context_init(&self, name: &str) {
        let count = {
            let mut state = self.state.lock();
            let count = state.context_inits.entry(name.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if count > self.config.reinit_warn_threshold {
            self.log_warning(
                format!("'{name}' 컨텍스트가 {count}회 초기화됨 (중복 초기화 의심)"),
                "context_init",
            );
        }
    }

    /// API 호출 기록 — 키는 "METHOD 경로"
    ///
    /// 1초 윈도우가 임계값을 넘으면 advisory 경고만 남긴다.
    /// 호출 자체를 막거나 지연시키지 않는다.
    pub fn track_api_call(&self, endpoint: &str, method: &str) {
        self.track_api_call_at(endpoint, method, Instant::now());
    }

    fn track_api_call_at(&self, endpoint: &str, method: &str, now: Instant) {
        let key = format!("{} {}", method.to_uppercase(), endpoint);
        let in_window = {
            let mut state = self.state.lock();
            let window = self.config.rate_window();
            state
                .api_calls
                .entry(key.clone())
                .or_insert_with(|| HealthCounter::new(window, now))
                .record(now)
        };

        if in_window > self.config.api_rate_threshold {
            self.log_warning(
                format!(
                    "API 호출 급증: {key} — {}ms 내 {in_window}회",
                    self.config.rate_window_ms
                ),
                "api_rate",
            );
        }
    }

    /// 컴포넌트 렌더 기록 — API 호출과 동일한 윈도우 로직, 임계값만 다르다
    pub fn track_render(&self, component: &str) {
        self.track_render_at(component, Instant::now());
    }

    fn track_render_at(&self, component: &str, now: Instant) {
        let in_window = {
            let mut state = self.state.lock();
            let window = self.config.rate_window();
            state
                .renders
                .entry(component.to_string())
                .or_insert_with(|| HealthCounter::new(window, now))
                .record(now)
        };

        if in_window > self.config.render_rate_threshold {
            self.log_warning(
                format!(
                    "렌더 급증: {component} — {}ms 내 {in_window}회",
                    self.config.rate_window_ms
                ),
                "render_rate",
            );
        }
    }

    /// 에러 기록 — 캡된 히스토리에 추가
    ///
    /// 운영 환경에서는 외부 싱크로 전달하고, 그 외에는 콘솔에만 남긴다.
    pub fn log_error(&self, message: impl Into<String>, context: impl Into<String>) {
        let entry = LogEntry::now(message, context);
        {
            let mut state = self.state.lock();
            state.total_errors += 1;
            push_capped(&mut state.errors, entry.clone(), self.config.history_cap);
        }

        if self.environment.is_production() {
            self.error_sink.capture_error(&ErrorRecord {
                message: entry.message,
                context: entry.context,
                metadata: serde_json::Value::Null,
                severity: Severity::High,
                timestamp: entry.timestamp,
                user_agent: format!("minwon-monitor/{}", env!("CARGO_PKG_VERSION")),
                page: None,
                user_id: None,
            });
        } else {
            error!("[{}] {}", entry.context, entry.message);
        }
    }

    /// 경고 기록 — 캡된 히스토리에 추가
    ///
    /// 에러와 동일하게 운영 환경에서는 외부 싱크로 전달한다
    /// (심각도만 Low로 낮춘다). 그 외에는 콘솔에만 남긴다.
    pub fn log_warning(&self, message: impl Into<String>, context: impl Into<String>) {
        let entry = LogEntry::now(message, context);
        {
            let mut state = self.state.lock();
            state.total_warnings += 1;
            push_capped(&mut state.warnings, entry.clone(), self.config.history_cap);
        }

        if self.environment.is_production() {
            self.error_sink.capture_error(&ErrorRecord {
                message: entry.message,
                context: entry.context,
                metadata: serde_json::Value::Null,
                severity: Severity::Low,
                timestamp: entry.timestamp,
                user_agent: format!("minwon-monitor/{}", env!("CARGO_PKG_VERSION")),
                page: None,
                user_id: None,
            });
        } else {
            warn!("[{}] {}", entry.context, entry.message);
        }
    }

    // ========================================================
    // 리포트 및 수명주기
    // ========================================================

    /// 현재 상태의 집계 리포트 합성 — 부수효과 없음
    pub fn metrics_report(&self) -> HealthReport {
        let state = self.state.lock();

        let api_calls: HashMap<String, u64> = state
            .api_calls
            .iter()
            .map(|(k, c)| (k.clone(), c.total))
            .collect();
        let renders: HashMap<String, u64> = state
            .renders
            .iter()
            .map(|(k, c)| (k.clone(), c.total))
            .collect();

        let uptime_secs = state.started_at.elapsed().as_secs();
        let total_api: u64 = api_calls.values().sum();
        let minutes = (uptime_secs.max(1) as f64) / 60.0;

        let severity = self.classify(&api_calls, &renders, &state);

        HealthReport {
            generated_at: Utc::now(),
            uptime_secs,
            calls_per_minute: total_api as f64 / minutes,
            api_calls,
            renders,
            context_inits: state.context_inits.clone(),
            recent_errors: last_n(&state.errors, 10),
            recent_warnings: last_n(&state.warnings, 10),
            total_errors: state.total_errors,
            total_warnings: state.total_warnings,
            severity,
        }
    }

    /// 마지막 관측 활동 시각 (API 호출/렌더 중 최신)
    pub fn last_activity(&self) -> Option<Instant> {
        let state = self.state.lock();
        state
            .api_calls
            .values()
            .chain(state.renders.values())
            .map(|c| c.last_seen)
            .max()
    }

    /// 심각도 3단계 분류 — 외부 싱크 전달 여부를 결정한다
    fn classify(
        &self,
        api_calls: &HashMap<String, u64>,
        renders: &HashMap<String, u64>,
        state: &MonitorState,
    ) -> ReportSeverity {
        let api_critical = api_calls.values().any(|&c| c > self.config.api_total_critical);
        let render_critical = renders
            .values()
            .any(|&c| c > self.config.render_total_critical);

        if api_critical || render_critical {
            ReportSeverity::Critical
        } else if state.errors.len() > self.config.history_pressure_threshold
            && state.warnings.len() > self.config.history_pressure_threshold
        {
            ReportSeverity::Warning
        } else {
            ReportSeverity::Normal
        }
    }

    /// 모든 상태 초기화 (테스트 격리 및 재시작용)
    pub fn reset(&self) {
        *self.state.lock() = MonitorState::new(Instant::now());
        debug!("헬스 모니터 상태 초기화");
    }

    /// 주기 리포트 루프 실행 (종료 신호 수신까지 블록)
    ///
    /// 운영 환경에서만 리포트를 생성한다. Normal 리포트는 로컬 로그로
    /// 끝나고, Warning/Critical만 외부 싱크로 전달해 싱크 폭주를 막는다.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        if !self.environment.is_production() {
            debug!("개발 환경 — 주기 헬스 리포트 비활성화");
            let _ = shutdown_rx.changed().await;
            return;
        }

        let mut interval = tokio::time::interval(self.config.report_interval());
        info!(
            "헬스 리포트 루프 시작: 주기={}ms",
            self.config.report_interval_ms
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let report = self.metrics_report();
                    match report.severity {
                        ReportSeverity::Critical => {
                            warn!(
                                "헬스 리포트 CRITICAL: api={}건, 에러={}건",
                                report.api_calls.values().sum::<u64>(),
                                report.total_errors
                            );
                            self.error_sink.capture_report(&report);
                        }
                        ReportSeverity::Warning => {
                            warn!(
                                "헬스 리포트 WARNING: 에러 히스토리 {}건, 경고 {}건",
                                report.recent_errors.len(),
                                report.recent_warnings.len()
                            );
                            self.error_sink.capture_report(&report);
                        }
                        ReportSeverity::Normal => {
                            debug!(
                                "헬스 리포트 정상: 분당 {:.1}회 호출",
                                report.calls_per_minute
                            );
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    info!("헬스 리포트 루프 종료");
                    break;
                }
            }
        }
    }

    /// 주기 리포트 루프를 백그라운드로 띄우고 중단 핸들 반환
    pub fn spawn_reporting(self: &Arc<Self>) -> ReportLoopHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let monitor = self.clone();
        let task = tokio::spawn(async move { monitor.run(shutdown_rx).await });
        ReportLoopHandle { shutdown_tx, task }
    }
}

/// 주기 리포트 루프 중단 핸들
pub struct ReportLoopHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReportLoopHandle {
    /// 루프 중단 — 리포트 타이머를 취소한다
    pub fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        self.task.abort();
    }
}

/// 캡을 넘으면 가장 오래된 엔트리를 제거하며 추가
fn push_capped(history: &mut VecDeque<LogEntry>, entry: LogEntry, cap: usize) {
    history.push_back(entry);
    while history.len() > cap {
        history.pop_front();
    }
}

/// 시간순을 유지한 마지막 n개
fn last_n(history: &VecDeque<LogEntry>, n: usize) -> Vec<LogEntry> {
    let skip = history.len().saturating_sub(n);
    history.iter().skip(skip).cloned().collect()
}
