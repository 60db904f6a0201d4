//! 수집기 HTTP 클라이언트.
//!
//! `CollectorClient` 포트 구현. 배치 1건당 단일 POST — 재시도는
//! 디스패처의 큐 복원 경로가 담당하므로 여기서는 하지 않는다.

use async_trait::async_trait;
use minwon_core::error::CoreError;
use minwon_core::models::event::TelemetryBatch;
use minwon_core::ports::collector::CollectorClient;
use std::time::Duration;
use tracing::{debug, warn};

/// 수집 엔드포인트 경로
const ANALYTICS_PATH: &str = "/api/analytics";

/// REST 수집기 클라이언트 — `CollectorClient` 포트 구현
pub struct HttpCollectorClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCollectorClient {
    /// 새 수집기 클라이언트 생성
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 수집 엔드포인트 전체 URL
    fn analytics_url(&self) -> String {
        format!("{}{}", self.base_url, ANALYTICS_PATH)
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    ///
    /// 2xx만 성공. 429/503은 별도 변형으로 구분하고,
    /// 나머지는 본문을 포함한 `CollectorRejected`로 매핑한다.
    async fn check_response(resp: reqwest::Response) -> Result<(), CoreError> {
        let status = resp.status();

        if status.is_success() {
            return Ok(());
        }

        let status_code = status.as_u16();
        let body = resp.text().await.unwrap_or_else(|e| {
            warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });

        match status_code {
            429 => {
                // Retry-After 파싱 없이 기본 60초 — 다음 주기 flush가 재시도
                Err(CoreError::RateLimit {
                    retry_after_secs: 60,
                })
            }
            503 => Err(CoreError::ServiceUnavailable(body)),
            _ => Err(CoreError::CollectorRejected {
                status: status_code,
                body,
            }),
        }
    }
}

#[async_trait]
impl CollectorClient for HttpCollectorClient {
    async fn deliver(&self, batch: &TelemetryBatch) -> Result<(), CoreError> {
        debug!(
            "배치 전송: 세션={}, {}건",
            batch.session_id,
            batch.len()
        );

        let resp = self
            .client
            .post(self.analytics_url())
            .json(batch)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("배치 전송 요청 실패: {e}")))?;

        Self::check_response(resp).await?;
        debug!("배치 전송 성공: {}건", batch.len());
        Ok(())
    }

    fn deliver_detached(&self, batch: TelemetryBatch) {
        // 종료 경로: 응답 확인 없이 전송만 시도. 태스크가 완료되기 전에
        // 런타임이 내려갈 수 있고, 그것이 이 전송의 계약이다.
        let client = self.client.clone();
        let url = self.analytics_url();
        let count = batch.len();

        tokio::spawn(async move {
            match client.post(url).json(&batch).send().await {
                Ok(resp) => debug!("종료 전송 완료: {}건, 상태={}", count, resp.status()),
                Err(e) => debug!("종료 전송 실패 (무시): {e}"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use minwon_core::models::event::TelemetryEvent;

    fn make_batch(count: usize) -> TelemetryBatch {
        TelemetryBatch {
            session_id: "sess_net".to_string(),
            events: (0..count)
                .map(|i| TelemetryEvent::new("navigation", format!("view_{i}")))
                .collect(),
            errors: vec![],
            performance: vec![],
            user_events: vec![],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn trims_trailing_slash() {
        let client =
            HttpCollectorClient::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.analytics_url(), "http://localhost:8000/api/analytics");
    }

    #[tokio::test]
    async fn deliver_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analytics")
            .match_header("content-type", "application/json")
            .with_status(200)
            .create_async()
            .await;

        let client = HttpCollectorClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let result = client.deliver(&make_batch(3)).await;
        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn deliver_sends_camel_case_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analytics")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "sessionId": "sess_net"
            })))
            .with_status(204)
            .create_async()
            .await;

        let client = HttpCollectorClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        client.deliver(&make_batch(1)).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_rejection() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/analytics")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let client = HttpCollectorClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = client.deliver(&make_batch(1)).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::CollectorRejected { status: 500, .. }
        ));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn rate_limit_429() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/analytics")
            .with_status(429)
            .with_body("Too Many Requests")
            .create_async()
            .await;

        let client = HttpCollectorClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = client.deliver(&make_batch(1)).await.unwrap_err();
        assert!(matches!(err, CoreError::RateLimit { .. }));
    }

    #[tokio::test]
    async fn service_unavailable_503() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/analytics")
            .with_status(503)
            .with_body("점검 중")
            .create_async()
            .await;

        let client = HttpCollectorClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = client.deliver(&make_batch(1)).await.unwrap_err();
        assert!(matches!(err, CoreError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        // 아무도 듣지 않는 포트
        let client =
            HttpCollectorClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let err = client.deliver(&make_batch(1)).await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
    }

    #[tokio::test]
    async fn detached_delivery_reaches_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analytics")
            .with_status(200)
            .create_async()
            .await;

        let client = HttpCollectorClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        client.deliver_detached(make_batch(2));

        // fire-and-forget이므로 완료 대기 수단이 없다 — 짧게 폴링
        for _ in 0..50 {
            if mock.matched_async().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        mock.assert_async().await;
    }
}
