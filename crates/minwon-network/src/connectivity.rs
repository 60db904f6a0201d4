//! 연결 상태 추적.
//!
//! 온라인/오프라인 플래그를 단일 소유로 관리한다. 상태 전환은
//! 플랫폼의 연결 이벤트(`set_online`)만이 일으킨다 — 전송 결과는
//! 연속 실패 카운터(`record_success` / `record_failure`)에만 반영되고,
//! 수집기 측 에러(500 연발 등)로 전송이 영구 정지되는 일은 없다.
//! 상태 변화는 watch 채널로 브로드캐스트되어 디스패처 러너가
//! 온라인 복귀 시 즉시 flush한다.
//!
//! 오프라인 전환은 플래그만 바꾼다 — 큐는 건드리지 않는다.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// 링크 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// 온라인 — flush 허용
    Online,
    /// 오프라인 — flush는 완전한 no-op
    Offline,
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkState::Online => write!(f, "Online"),
            LinkState::Offline => write!(f, "Offline"),
        }
    }
}

/// 연결 상태 추적기
pub struct ConnectivityTracker {
    /// 현재 온라인 상태 (atomic for lock-free access)
    is_online: AtomicBool,
    /// 연속 전송 실패 횟수 (진단용 — 상태 전환에는 관여하지 않는다)
    failure_count: AtomicU64,
    /// 상태 변경 브로드캐스트
    state_tx: watch::Sender<LinkState>,
    /// 상태 수신기 (복제 가능)
    state_rx: watch::Receiver<LinkState>,
}

impl ConnectivityTracker {
    /// 새 추적기 생성 (초기 상태: 온라인)
    pub fn new() -> Self {
        let (state_tx, state_rx) = watch::channel(LinkState::Online);
        Self {
            is_online: AtomicBool::new(true),
            failure_count: AtomicU64::new(0),
            state_tx,
            state_rx,
        }
    }

    /// 현재 온라인 여부
    pub fn is_online(&self) -> bool {
        self.is_online.load(Ordering::Relaxed)
    }

    /// 현재 링크 상태
    pub fn state(&self) -> LinkState {
        *self.state_rx.borrow()
    }

    /// 상태 변경 수신기 생성 — 러너가 온라인 복귀 flush에 사용
    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.state_rx.clone()
    }

    /// 플랫폼 연결 이벤트 반영 (브라우저 online/offline 이벤트에 해당)
    ///
    /// 유일한 상태 전환 경로. 온라인 전환 시 실패 카운터를 리셋한다.
    /// 큐 내용은 변경하지 않는다.
    pub fn set_online(&self, online: bool) {
        let was_online = self.is_online.swap(online, Ordering::Relaxed);
        if was_online == online {
            return;
        }

        if online {
            self.failure_count.store(0, Ordering::Relaxed);
            info!("온라인 전환 — 대기 중인 텔레메트리 flush 예정");
            let _ = self.state_tx.send(LinkState::Online);
        } else {
            info!("오프라인 전환 — 큐는 유지, 전송만 중단");
            let _ = self.state_tx.send(LinkState::Offline);
        }
    }

    /// 전송 성공 기록 — 실패 카운터 리셋
    pub fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
    }

    /// 전송 실패 기록 — 카운터만 증가, 상태는 바꾸지 않는다
    ///
    /// 수집기 에러와 네트워크 단절을 여기서 구분할 수 없으므로
    /// 다음 주기/임계값 flush가 그대로 재시도한다.
    pub fn record_failure(&self) {
        let count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("전송 실패 기록 (연속 {count}회)");
    }

    /// 연속 실패 횟수
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }
}

impl Default for ConnectivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Arc로 감싼 ConnectivityTracker
pub type SharedConnectivity = Arc<ConnectivityTracker>;
