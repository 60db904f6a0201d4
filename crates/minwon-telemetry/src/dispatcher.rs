//! 텔레메트리 디스패처.
//!
//! 애플리케이션 어디서든 호출되는 track 계열 진입점과 flush 프로토콜.
//! 계측 실패가 계측 대상을 망가뜨리지 않는 것이 이 컴포넌트의 중심
//! 불변식이다: track 계열은 에러를 반환하지 않고, 전송 실패는
//! 큐 복원 + 경고 로그로 흡수된다.
//!
//! flush의 유일한 suspension point는 네트워크 await이며, 큐의
//! 스냅샷-후-클리어는 그 직전에 뮤텍스 아래에서 동기적으로 끝난다.
//! 따라서 전송 중 도착한 이벤트는 절대 중복 전송되지 않고,
//! 실패 복원분은 그 앞에 놓여 순서가 유지된다.

use chrono::{Duration as ChronoDuration, Utc};
use minwon_core::config::{DispatchConfig, Environment};
use minwon_core::error::CoreError;
use minwon_core::models::event::{
    ErrorRecord, PerformanceSample, Severity, TelemetryEvent, UserActionRecord,
};
use minwon_core::models::status::QueueStatus;
use minwon_core::ports::collector::CollectorClient;
use minwon_core::ports::sink::{AnalyticsSink, ErrorSink, NoopSink};
use minwon_network::connectivity::SharedConnectivity;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::queues::QueueSet;

/// 이벤트 버퍼/디스패처
///
/// 명시적으로 생성되는 단일 인스턴스 수명주기: 애플리케이션 시작 시
/// 한 번 만들어 `Arc`로 공유한다. 테스트는 격리된 인스턴스를 만든다.
pub struct TelemetryDispatcher {
    /// 세션 ID — 생성 시 1회 발급, 재시작 간 유지되지 않는다
    session_id: String,
    config: DispatchConfig,
    environment: Environment,
    /// 현재 사용자 ID (런타임 설정 가능, 이후 호출에만 적용)
    user_id: RwLock<Option<String>>,
    /// 마지막 page_view 경로 — 에러 리포트에 첨부
    current_page: RwLock<Option<String>>,
    /// 수집 활성화 플래그
    enabled: AtomicBool,
    /// 4개 카테고리 큐 (단일 뮤텍스 아래)
    queues: Mutex<QueueSet>,
    collector: Arc<dyn CollectorClient>,
    connectivity: SharedConnectivity,
    analytics_sink: Arc<dyn AnalyticsSink>,
    error_sink: Arc<dyn ErrorSink>,
    /// 임계값 도달 시 러너를 깨우는 신호
    flush_signal: Notify,
}

impl TelemetryDispatcher {
    /// 새 디스패처 생성
    pub fn new(
        config: DispatchConfig,
        environment: Environment,
        collector: Arc<dyn CollectorClient>,
        connectivity: SharedConnectivity,
    ) -> Self {
        let session_id = format!("sess_{}", Uuid::new_v4());
        info!("텔레메트리 세션 시작: {session_id}");

        Self {
            session_id,
            enabled: AtomicBool::new(config.enabled),
            config,
            environment,
            user_id: RwLock::new(None),
            current_page: RwLock::new(None),
            queues: Mutex::new(QueueSet::new()),
            collector,
            connectivity,
            analytics_sink: Arc::new(NoopSink),
            error_sink: Arc::new(NoopSink),
            flush_signal: Notify::new(),
        }
    }

    /// 제품 분석 싱크 설정
    pub fn with_analytics_sink(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics_sink = sink;
        self
    }

    /// 에러 추적 싱크 설정
    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.error_sink = sink;
        self
    }

    /// 세션 ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// 연결 상태 추적기
    pub fn connectivity(&self) -> &SharedConnectivity {
        &self.connectivity
    }

    /// 주기 flush 간격
    pub fn flush_interval(&self) -> Duration {
        self.config.flush_interval()
    }

    /// 현재 사용자 ID 설정 — 이후 호출부터 적용, 소급 적용 없음
    pub fn set_user_id(&self, user_id: Option<String>) {
        *self.user_id.write() = user_id;
    }

    /// 수집 활성화/비활성화
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        debug!("텔레메트리 수집 {}", if enabled { "활성화" } else { "비활성화" });
    }

    /// 수집 활성화 여부
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    // ========================================================
    // track 계열 진입점 — 절대 에러를 전파하지 않는다
    // ========================================================

    /// 일반 이벤트 추적
    ///
    /// 현재 사용자 ID와 타임스탬프를 찍고 큐에 추가한다.
    /// 분석 싱크에도 best-effort 전달 (블로킹 없음).
    pub fn track(&self, mut event: TelemetryEvent) {
        if !self.is_enabled() {
            return;
        }

        event.timestamp = Utc::now();
        if event.user_id.is_none() {
            event.user_id = self.user_id.read().clone();
        }

        self.analytics_sink.report_event(&event);

        let total = self.queues.lock().push_event(event);
        self.maybe_signal_flush(total);
    }

    /// 에러 추적
    ///
    /// 에러 싱크에는 항상 전달하고, 운영 환경이 아닐 때만 콘솔에 출력한다.
    pub fn track_error(
        &self,
        message: impl Into<String>,
        context: impl Into<String>,
        metadata: serde_json::Value,
        severity: Severity,
    ) {
        if !self.is_enabled() {
            return;
        }

        let record = ErrorRecord {
            message: message.into(),
            context: context.into(),
            metadata,
            severity,
            timestamp: Utc::now(),
            user_agent: self.config.client_info.clone(),
            page: self.current_page.read().clone(),
            user_id: self.user_id.read().clone(),
        };

        self.error_sink.capture_error(&record);
        if !self.environment.is_production() {
            error!("[{}] {} ({:?})", record.context, record.message, record.severity);
        }

        let total = self.queues.lock().push_error(record);
        self.maybe_signal_flush(total);
    }

    /// 성능 샘플 추적
    pub fn track_performance(
        &self,
        name: impl Into<String>,
        duration_ms: f64,
        metadata: serde_json::Value,
    ) {
        if !self.is_enabled() {
            return;
        }

        let now = Utc::now();
        let started_at = now
            - ChronoDuration::milliseconds(duration_ms as i64);
        let sample = PerformanceSample {
            name: name.into(),
            duration_ms,
            started_at,
            ended_at: now,
            timestamp: now,
            metadata,
        };

        let total = self.queues.lock().push_performance(sample);
        self.maybe_signal_flush(total);
    }

    /// 사용자 행동 추적
    ///
    /// 사용자 ID가 설정되어 있지 않으면 조용히 폐기한다 — 익명 행동을
    /// 사용자에게 귀속시키지 않는 프라이버시 계약이며, 에러가 아니다.
    pub fn track_user_action(
        &self,
        action: impl Into<String>,
        entity_type: Option<&str>,
        entity_id: Option<&str>,
        metadata: serde_json::Value,
    ) {
        if !self.is_enabled() {
            return;
        }

        let user_id = match self.user_id.read().clone() {
            Some(id) => id,
            None => {
                debug!("익명 사용자 행동 폐기 (user_id 미설정)");
                return;
            }
        };

        let record = UserActionRecord {
            user_id,
            action: action.into(),
            entity_type: entity_type.map(str::to_string),
            entity_id: entity_id.map(str::to_string),
            metadata,
            timestamp: Utc::now(),
        };

        let total = self.queues.lock().push_user_action(record);
        self.maybe_signal_flush(total);
    }

    // ========================================================
    // 편의 래퍼 — 카테고리 태그를 고정한 track 호출
    // ========================================================

    /// 페이지 조회 추적 — 이후 에러 리포트의 page 필드에도 반영된다
    pub fn track_page_view(&self, path: impl Into<String>) {
        let path = path.into();
        *self.current_page.write() = Some(path.clone());
        self.track(TelemetryEvent::new("navigation", "page_view").with_label(path));
    }

    /// 민원 이벤트 추적 — 사용자 행동으로도 귀속 기록한다
    pub fn track_complaint_event(
        &self,
        action: impl Into<String>,
        complaint_id: Option<&str>,
        metadata: serde_json::Value,
    ) {
        let action = action.into();
        let mut event =
            TelemetryEvent::new("complaint", action.clone()).with_metadata(metadata.clone());
        if let Some(id) = complaint_id {
            event = event.with_label(id);
        }
        self.track(event);
        self.track_user_action(
            format!("complaint_{action}"),
            Some("complaint"),
            complaint_id,
            metadata,
        );
    }

    /// 인증 이벤트 추적 (로그인/로그아웃 등)
    pub fn track_auth_event(&self, action: impl Into<String>) {
        self.track(TelemetryEvent::new("auth", action));
    }

    /// 폼 이벤트 추적 (제출/검증 실패 등)
    pub fn track_form_event(&self, form: impl Into<String>, action: impl Into<String>) {
        self.track(TelemetryEvent::new("form", action).with_label(form));
    }

    /// 검색 이벤트 추적
    pub fn track_search_event(&self, query_label: impl Into<String>, result_count: u64) {
        self.track(
            TelemetryEvent::new("search", "query")
                .with_label(query_label)
                .with_value(result_count as f64),
        );
    }

    /// 큐 및 세션 상태 스냅샷 — 읽기 전용, 부수효과 없음
    pub fn queue_status(&self) -> QueueStatus {
        let (events, errors, performance, user_actions) = self.queues.lock().lens();
        QueueStatus {
            events,
            errors,
            performance,
            user_actions,
            session_id: self.session_id.clone(),
            user_id: self.user_id.read().clone(),
            enabled: self.is_enabled(),
            online: self.connectivity.is_online(),
        }
    }

    // ========================================================
    // flush 프로토콜
    // ========================================================

    /// 대기 중인 모든 텔레메트리를 수집기로 전송
    ///
    /// 오프라인이면 완전한 no-op: 스냅샷도, 클리어도, 전송 시도도 없다.
    /// 실패 시 스냅샷 전체를 각 큐의 머리에 복원하고 다음 주기를 기다린다
    /// (즉시 재시도 없음 — 주기/임계값 flush가 유일한 재시도 메커니즘).
    pub async fn flush(&self) -> Result<usize, CoreError> {
        if !self.connectivity.is_online() {
            debug!("오프라인 — flush 건너뜀 (큐 유지)");
            return Ok(0);
        }

        // 동기 스냅샷+클리어. 이후 도착하는 이벤트는 새 큐에 쌓인다.
        let batch = {
            let mut queues = self.queues.lock();
            if queues.is_empty() {
                return Ok(0);
            }
            queues.drain_batch(&self.session_id)
        };
        let count = batch.len();

        match self.collector.deliver(&batch).await {
            Ok(()) => {
                self.connectivity.record_success();
                debug!("flush 성공: {count}건 전송");
                Ok(count)
            }
            Err(e) => {
                self.queues.lock().restore_front(batch);
                self.connectivity.record_failure();
                warn!("flush 실패 — {count}건 큐 복원: {e}");
                Err(e)
            }
        }
    }

    /// 종료 시 잔여 큐의 fire-and-forget 전송
    ///
    /// 온라인일 때만 시도하며, 완료 확인도 재시도도 없다.
    pub fn shutdown_flush(&self) {
        if !self.connectivity.is_online() {
            debug!("오프라인 종료 — 잔여 {}건 폐기", self.queues.lock().total_len());
            return;
        }

        let batch = {
            let mut queues = self.queues.lock();
            if queues.is_empty() {
                return;
            }
            queues.drain_batch(&self.session_id)
        };

        info!("종료 전송: 잔여 {}건 (완료 비보장)", batch.len());
        self.collector.deliver_detached(batch);
    }

    /// 러너가 대기하는 임계값 flush 신호
    pub(crate) async fn flush_notified(&self) {
        self.flush_signal.notified().await;
    }

    /// 큐 합계가 임계값에 도달하면 즉시 flush 신호를 보낸다
    fn maybe_signal_flush(&self, total: usize) {
        if total >= self.config.flush_threshold {
            debug!("큐 합계 {total} — 임계값 도달, 즉시 flush 신호");
            self.flush_signal.notify_one();
        }
    }
}
