//! # minwon-telemetry
//!
//! 이벤트 버퍼/디스패처. 애플리케이션 전역의 계측 호출을 카테고리별
//! 큐에 버퍼링하고, 임계값/주기/온라인 복귀 트리거로 수집기에 배치
//! 전송한다. 계측 실패는 절대 호출자에게 전파되지 않는다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use minwon_telemetry::dispatcher::TelemetryDispatcher;
//! use minwon_telemetry::runner::TelemetryRunner;
//!
//! let dispatcher = Arc::new(TelemetryDispatcher::new(
//!     config.dispatch, config.environment, collector, connectivity,
//! ));
//! let runner = TelemetryRunner::new(dispatcher.clone());
//! tokio::spawn(async move { runner.run(shutdown_rx).await });
//!
//! dispatcher.track_page_view("/complaints");
//! ```

pub mod dispatcher;
mod queues;
pub mod runner;
