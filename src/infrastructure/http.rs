//! reqwest-backed implementation of the HTTP transport seam

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::domain::{HttpResponse, HttpTransport, SourceError};

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| format!("Failed to build client: {}", e))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<HttpResponse, SourceError> {
        let resp = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_returns_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::new("test-agent").unwrap();
        let url = Url::parse(&format!("{}/missing", mock_server.uri())).unwrap();
        let resp = transport.get(&url, Duration::from_secs(5)).await.unwrap();

        assert_eq!(resp.status, 404);
        assert_eq!(resp.body, "nope");
        assert!(!resp.is_success());
    }

    #[tokio::test]
    async fn test_get_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::new("test-agent").unwrap();
        let url = Url::parse(&mock_server.uri()).unwrap();
        let result = transport.get(&url, Duration::from_millis(100)).await;

        assert_eq!(result.unwrap_err(), SourceError::Timeout);
    }
}
