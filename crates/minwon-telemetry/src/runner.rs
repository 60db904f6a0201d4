//! 텔레메트리 러너.
//!
//! 디스패처의 수명주기 와이어링: 주기 flush 타이머, 임계값 신호,
//! 온라인 복귀 flush, 종료 시 fire-and-forget 전송을 단일 루프에서
//! 오케스트레이션한다. watch 채널로 명시적 종료를 지원한다.

use minwon_network::connectivity::LinkState;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::dispatcher::TelemetryDispatcher;

/// 디스패처 수명주기 러너
pub struct TelemetryRunner {
    dispatcher: Arc<TelemetryDispatcher>,
}

impl TelemetryRunner {
    /// 새 러너 생성
    pub fn new(dispatcher: Arc<TelemetryDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// flush 루프 실행 (종료 신호 수신까지 블록)
    ///
    /// 각 flush 시도는 독립적이다: 실패는 경고 로그와 큐 복원으로
    /// 끝나고 다음 트리거(주기/임계값/온라인 복귀)가 재시도한다.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        let dispatcher = self.dispatcher.clone();
        let mut link_rx = dispatcher.connectivity().subscribe();
        let mut interval = tokio::time::interval(dispatcher.flush_interval());
        // interval의 첫 tick은 즉시 발화 — 빈 큐 flush는 no-op이므로 무해
        info!(
            "텔레메트리 러너 시작: 주기={}ms, 세션={}",
            dispatcher.flush_interval().as_millis(),
            dispatcher.session_id()
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    Self::try_flush(&dispatcher, "주기").await;
                }
                _ = dispatcher.flush_notified() => {
                    Self::try_flush(&dispatcher, "임계값").await;
                }
                changed = link_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    // 온라인 복귀 시 오프라인 동안 쌓인 큐를 즉시 배출
                    if *link_rx.borrow() == LinkState::Online {
                        Self::try_flush(&dispatcher, "온라인 복귀").await;
                    }
                }
                _ = shutdown_rx.changed() => {
                    info!("텔레메트리 러너 종료 — 잔여 큐 전송 시도");
                    dispatcher.shutdown_flush();
                    break;
                }
            }
        }
    }

    async fn try_flush(dispatcher: &TelemetryDispatcher, trigger: &str) {
        match dispatcher.flush().await {
            Ok(0) => {}
            Ok(count) => debug!("{trigger} flush: {count}건 전송"),
            Err(e) => warn!("{trigger} flush 실패 (다음 주기 재시도): {e}"),
        }
    }
}
