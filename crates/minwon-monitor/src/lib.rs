//! 런타임 헬스 모니터 크레이트.
//!
//! 컨텍스트 중복 초기화, API 호출/렌더 버스트, 에러·경고 누적을
//! 관측하고 운영 환경에서 주기 헬스 리포트를 합성한다.
//! 텔레메트리 디스패처와 독립적으로 동작하는 순수 관측 계층.

pub mod monitor;
mod rate_window;

pub use monitor::{ReportLoopHandle, RuntimeMonitor};
