//! # minwon-network
//!
//! 수집기 HTTP 어댑터와 연결 상태 추적.
//! `POST /api/analytics` 배치 전송(`CollectorClient` 포트 구현)과
//! 온라인/오프라인 전환 브로드캐스트를 담당한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use minwon_network::collector_client::HttpCollectorClient;
//! use minwon_network::connectivity::ConnectivityTracker;
//! ```

pub mod collector_client;
pub mod connectivity;
