//! 슬라이딩 레이트 윈도우.
//!
//! 키별 타임스탬프 deque를 윈도우 길이(기본 1초)로 잘라내며
//! 버스트를 감지한다. 누적 카운트는 절대 잘라내지 않는다 —
//! 수명 총계는 리포트에서 그대로 쓰인다.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// 고정 길이 슬라이딩 윈도우
#[derive(Debug)]
pub(crate) struct RateWindow {
    window: Duration,
    stamps: VecDeque<Instant>,
}

impl RateWindow {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            stamps: VecDeque::new(),
        }
    }

    /// 관측 1건 기록 후 윈도우 내 관측 수 반환
    ///
    /// 윈도우를 벗어난 타임스탬프는 기록 전에 잘라낸다.
    pub(crate) fn observe(&mut self, now: Instant) -> usize {
        while let Some(&front) = self.stamps.front() {
            if now.duration_since(front) > self.window {
                self.stamps.pop_front();
            } else {
                break;
            }
        }
        self.stamps.push_back(now);
        self.stamps.len()
    }
}

/// 키 1개의 헬스 카운터 — 수명 총계 + 슬라이딩 윈도우
#[derive(Debug)]
pub(crate) struct HealthCounter {
    /// 누적 카운트 (잘라내지 않음)
    pub(crate) total: u64,
    /// 마지막 관측 시각
    pub(crate) last_seen: Instant,
    window: RateWindow,
}

impl HealthCounter {
    pub(crate) fn new(window: Duration, now: Instant) -> Self {
        Self {
            total: 0,
            last_seen: now,
            window: RateWindow::new(window),
        }
    }

    /// 관측 기록 — 윈도우 내 관측 수 반환
    pub(crate) fn record(&mut self, now: Instant) -> usize {
        self.total += 1;
        self.last_seen = now;
        self.window.observe(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_counts_within_duration() {
        let base = Instant::now();
        let mut window = RateWindow::new(Duration::from_millis(1_000));

        for i in 0..5 {
            let count = window.observe(base + Duration::from_millis(i * 100));
            assert_eq!(count, (i + 1) as usize);
        }
    }

    #[test]
    fn old_stamps_are_pruned() {
        let base = Instant::now();
        let mut window = RateWindow::new(Duration::from_millis(1_000));

        window.observe(base);
        window.observe(base + Duration::from_millis(100));
        // 1초 경계를 넘긴 관측 — 앞의 두 개는 탈락
        let count = window.observe(base + Duration::from_millis(1_500));
        assert_eq!(count, 1);
    }

    #[test]
    fn counter_total_is_never_pruned() {
        let base = Instant::now();
        let mut counter = HealthCounter::new(Duration::from_millis(1_000), base);

        for i in 0..20 {
            counter.record(base + Duration::from_millis(i * 500));
        }
        // 윈도우는 잘려도 수명 총계는 유지
        assert_eq!(counter.total, 20);
    }
}
