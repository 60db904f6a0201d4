//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! `minwon-network`가 수집기 포트를 구현하고,
//! 애플리케이션이 `Arc<dyn T>`로 디스패처/모니터에 와이어링한다.
//!
//! 수집기 포트는 `async_trait` 매크로로 object safety를 보장한다.
//! 싱크 포트는 best-effort 동기 호출이므로 일반 trait로 둔다.

pub mod collector;
pub mod sink;
